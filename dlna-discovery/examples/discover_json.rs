//! Simple media-server discovery that outputs JSON for scripting
//!
//! Usage: cargo run -p dlna-sdk-discovery --example discover_json [seconds]

use std::collections::HashSet;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use serde::Serialize;

use dlna_discovery::{
    resolve_devices, DescriptionClient, DiscoveryEvent, DiscoveryListener,
    MEDIA_SERVER_DEVICE_TYPE,
};

#[derive(Serialize)]
struct ServerInfo {
    udn: String,
    name: String,
    control_url: String,
    manufacturer: String,
    icon_url: String,
}

fn main() {
    let timeout = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);

    let (tx, rx) = mpsc::channel();
    let listener = DiscoveryListener::spawn(MEDIA_SERVER_DEVICE_TYPE, 2, tx)
        .expect("Failed to bind SSDP socket");
    listener.search().expect("Failed to send search");

    let descriptions = DescriptionClient::new(Duration::from_secs(3))
        .expect("Failed to build HTTP client");

    let deadline = Instant::now() + Duration::from_secs(timeout);
    let mut seen_locations = HashSet::new();
    let mut servers = Vec::new();

    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        let event = match rx.recv_timeout(remaining) {
            Ok(event) => event,
            Err(_) => break,
        };

        let DiscoveryEvent::Alive { location } = event else {
            continue;
        };
        if !seen_locations.insert(location.clone()) {
            continue;
        }

        let Ok(xml) = descriptions.fetch(&location) else {
            continue;
        };
        let Ok(devices) = resolve_devices(&xml, &location) else {
            continue;
        };
        servers.extend(devices.into_iter().map(|d| ServerInfo {
            udn: d.udn,
            name: d.friendly_name,
            control_url: d.location,
            manufacturer: d.manufacturer,
            icon_url: d.icon_url,
        }));
    }

    listener.shutdown();
    println!("{}", serde_json::to_string_pretty(&servers).unwrap());
}
