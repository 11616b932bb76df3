//! DLNA media-server discovery library
//!
//! This crate provides the network-presence half of a DLNA control point:
//! it sends SSDP searches, listens for device announcements and departures,
//! fetches UPnP device descriptions, and resolves the ContentDirectory
//! control endpoint of every media server it finds.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::mpsc;
//! use dlna_discovery::{DiscoveryListener, DiscoveryEvent, MEDIA_SERVER_DEVICE_TYPE};
//!
//! let (tx, rx) = mpsc::channel();
//! let listener = DiscoveryListener::spawn(MEDIA_SERVER_DEVICE_TYPE, 2, tx).unwrap();
//! listener.search().unwrap();
//!
//! for event in rx {
//!     match event {
//!         DiscoveryEvent::Alive { location } => println!("device at {}", location),
//!         DiscoveryEvent::ByeBye { udn } => println!("{} left", udn),
//!     }
//! }
//! ```

mod error;
mod ssdp;
pub mod device;
mod listener;

pub use device::{resolve_devices, DescriptionClient};
pub use error::{DiscoveryError, Result};
pub use listener::DiscoveryListener;

/// UPnP device type targeted by a full-network media-server search.
pub const MEDIA_SERVER_DEVICE_TYPE: &str = "urn:schemas-upnp-org:device:MediaServer:1";

/// Service-type prefix identifying a browsable ContentDirectory service,
/// matched without the trailing version so v1 and v2 servers both qualify.
pub const CONTENT_DIRECTORY_SERVICE_PREFIX: &str =
    "urn:schemas-upnp-org:service:ContentDirectory:";

/// A media server discovered on the network.
///
/// Records are only produced for devices whose description exposes a
/// ContentDirectory service with a resolvable control URL; anything else on
/// the network is ignored during resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Unique device name (UDN), e.g. "uuid:4d696e69-444c-164e-9d41-001c42f0a410"
    pub udn: String,
    /// Friendly name advertised by the device
    pub friendly_name: String,
    /// Resolved ContentDirectory control endpoint URL
    pub location: String,
    /// Absolute URL of the largest advertised icon, empty if none
    pub icon_url: String,
    /// Manufacturer string, empty if not advertised
    pub manufacturer: String,
    /// Device classification
    pub class: DeviceClass,
}

/// Classification of a discovered device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Unknown,
    MediaServer,
    MediaRenderer,
}

/// Events emitted by the discovery listener.
///
/// `Alive` carries the description location of an announced device or search
/// respondent; `ByeBye` carries the UDN of a departing device.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryEvent {
    /// A device announced itself or answered a search
    Alive { location: String },
    /// A device announced its departure
    ByeBye { udn: String },
}
