//! Device description parsing and control-endpoint resolution.
//!
//! This module parses UPnP device description XML and turns it into
//! `Device` records. A description only yields records for devices that
//! expose a ContentDirectory service with a resolvable control URL;
//! printers, routers, and renderers advertising unrelated capabilities
//! resolve to nothing.

use serde::Deserialize;
use url::Url;

use crate::error::{DiscoveryError, Result};
use crate::{Device, DeviceClass, CONTENT_DIRECTORY_SERVICE_PREFIX};

/// UPnP device description root element.
#[derive(Debug, Deserialize)]
pub struct Root {
    #[serde(rename = "URLBase")]
    pub url_base: Option<String>,
    pub device: DeviceDescription,
}

/// A single `<device>` element, possibly carrying embedded devices.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub friendly_name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(rename = "UDN", default)]
    pub udn: String,
    pub icon_list: Option<IconList>,
    pub service_list: Option<ServiceList>,
    pub device_list: Option<DeviceList>,
}

#[derive(Debug, Deserialize)]
pub struct IconList {
    #[serde(rename = "icon", default)]
    pub icons: Vec<Icon>,
}

/// Icon dimensions arrive as element text; kept as strings and parsed
/// leniently since devices ship all kinds of garbage here.
#[derive(Debug, Deserialize)]
pub struct Icon {
    pub width: Option<String>,
    pub height: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceList {
    #[serde(rename = "service", default)]
    pub services: Vec<Service>,
}

#[derive(Debug, Deserialize)]
pub struct Service {
    #[serde(rename = "serviceType")]
    pub service_type: Option<String>,
    #[serde(rename = "controlURL")]
    pub control_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceList {
    #[serde(rename = "device", default)]
    pub devices: Vec<DeviceDescription>,
}

/// Blocking HTTP client for device description documents.
#[derive(Debug, Clone)]
pub struct DescriptionClient {
    http: reqwest::blocking::Client,
}

impl DescriptionClient {
    /// Create a client with the given per-request timeout.
    pub fn new(timeout: std::time::Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DiscoveryError::NetworkError(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self { http })
    }

    /// Fetch a device description document from its advertised location.
    pub fn fetch(&self, location: &str) -> Result<String> {
        let response = self.http.get(location).send().map_err(|e| {
            DiscoveryError::NetworkError(format!("Failed to fetch device description: {}", e))
        })?;

        response.text().map_err(|e| {
            DiscoveryError::NetworkError(format!("Failed to read response body: {}", e))
        })
    }
}

/// Parse a description document and resolve every browsable device in it.
///
/// `location` is the URL the description was fetched from; relative control
/// and icon URLs are resolved against the `URLBase` element when present,
/// falling back to the description location.
pub fn resolve_devices(xml: &str, location: &str) -> Result<Vec<Device>> {
    let root: Root = quick_xml::de::from_str(xml)
        .map_err(|e| DiscoveryError::ParseError(format!("Failed to parse description: {}", e)))?;

    let base = root.url_base.as_deref().unwrap_or(location);
    let base_url = Url::parse(base)
        .map_err(|e| DiscoveryError::ParseError(format!("Bad description base URL: {}", e)))?;

    let mut devices = Vec::new();
    collect_devices(&root.device, &base_url, &mut devices);
    Ok(devices)
}

fn collect_devices(desc: &DeviceDescription, base: &Url, out: &mut Vec<Device>) {
    if let Some(device) = resolve_device(desc, base) {
        out.push(device);
    }
    if let Some(list) = &desc.device_list {
        for embedded in &list.devices {
            collect_devices(embedded, base, out);
        }
    }
}

/// Resolve a single device element, or `None` when it is not browsable.
///
/// A record requires a UDN, a friendly name, and a ContentDirectory service
/// whose control URL joins cleanly against the base. Anything less is
/// silently skipped.
fn resolve_device(desc: &DeviceDescription, base: &Url) -> Option<Device> {
    if desc.udn.is_empty() || desc.friendly_name.is_empty() {
        return None;
    }

    let control = desc
        .service_list
        .as_ref()?
        .services
        .iter()
        .find(|s| {
            s.service_type
                .as_deref()
                .is_some_and(|t| t.starts_with(CONTENT_DIRECTORY_SERVICE_PREFIX))
        })
        .and_then(|s| s.control_url.as_deref())?;

    let control_url = match base.join(control) {
        Ok(u) => u,
        Err(e) => {
            tracing::debug!("Unresolvable control URL {:?} for {}: {}", control, desc.udn, e);
            return None;
        }
    };

    tracing::debug!(
        "Resolved {} ({}) control endpoint {}",
        desc.friendly_name,
        desc.udn,
        control_url
    );

    Some(Device {
        udn: desc.udn.clone(),
        friendly_name: desc.friendly_name.clone(),
        location: control_url.to_string(),
        icon_url: best_icon_url(desc, base).unwrap_or_default(),
        manufacturer: desc.manufacturer.clone(),
        class: DeviceClass::MediaServer,
    })
}

/// Pick the largest advertised icon and make its URL absolute.
fn best_icon_url(desc: &DeviceDescription, base: &Url) -> Option<String> {
    let icons = &desc.icon_list.as_ref()?.icons;

    let mut best: Option<(u32, u32, &str)> = None;
    for icon in icons {
        let (Some(width), Some(height), Some(url)) = (
            icon.width.as_deref().and_then(|w| w.trim().parse::<u32>().ok()),
            icon.height.as_deref().and_then(|h| h.trim().parse::<u32>().ok()),
            icon.url.as_deref(),
        ) else {
            continue;
        };
        match best {
            Some((w, h, _)) if width <= w || height <= h => {}
            _ => best = Some((width, height, url)),
        }
    }

    let (_, _, path) = best?;
    base.join(path).ok().map(|u| u.to_string())
}
