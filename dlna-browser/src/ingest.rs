//! Ingestion of asynchronous discovery notifications.
//!
//! Runs on its own thread, consuming the discovery event stream and turning
//! it into registry mutations plus change-queue entries. Description
//! resolution is a blocking fetch and always happens with no lock held;
//! the registry is consulted before the fetch (via the location cache) and
//! again at insert time, so duplicate announcements stay no-ops.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use dlna_discovery::{device, Device, DiscoveryEvent};

use crate::client::DirectoryClient;
use crate::queue::EventQueue;
use crate::registry::DeviceRegistry;

pub(crate) struct EventIngestor {
    pub registry: Arc<DeviceRegistry>,
    pub added: Arc<EventQueue<Device>>,
    pub removed: Arc<EventQueue<String>>,
    pub client: Arc<dyn DirectoryClient>,
}

impl EventIngestor {
    pub fn spawn(self, events: mpsc::Receiver<DiscoveryEvent>) -> JoinHandle<()> {
        thread::spawn(move || self.run(events))
    }

    fn run(&self, events: mpsc::Receiver<DiscoveryEvent>) {
        tracing::info!("Event ingestor started");

        // Which UDNs each description location resolved to, so routine
        // re-announcements skip the blocking fetch. Only this thread
        // touches it.
        let mut resolved: HashMap<String, Vec<String>> = HashMap::new();

        for event in events {
            match event {
                DiscoveryEvent::Alive { location } => {
                    self.handle_alive(&mut resolved, &location)
                }
                DiscoveryEvent::ByeBye { udn } => self.handle_byebye(&udn),
            }
        }

        tracing::info!("Discovery event stream ended, event ingestor stopped");
    }

    fn handle_alive(&self, resolved: &mut HashMap<String, Vec<String>>, location: &str) {
        if let Some(udns) = resolved.get(location) {
            if !udns.is_empty() && udns.iter().all(|udn| self.registry.contains(udn)) {
                // Re-announcement of devices we already carry
                return;
            }
        }

        let xml = match self.client.resolve_description(location) {
            Ok(xml) => xml,
            Err(e) => {
                tracing::debug!("Description fetch failed for {}: {}", location, e);
                return;
            }
        };

        let devices = match device::resolve_devices(&xml, location) {
            Ok(devices) => devices,
            Err(e) => {
                tracing::debug!("Dropping unusable description from {}: {}", location, e);
                return;
            }
        };

        let mut udns = Vec::with_capacity(devices.len());
        for device in devices {
            udns.push(device.udn.clone());
            // Re-checked under the registry lock: a concurrent announcement
            // may have won the race while we were fetching
            if self.registry.upsert(device.clone()) {
                tracing::info!(
                    "Device found: {} ({}) at {}",
                    device.friendly_name,
                    device.udn,
                    device.location
                );
                self.added.push(device);
            }
        }
        resolved.insert(location.to_string(), udns);
    }

    fn handle_byebye(&self, udn: &str) {
        if self.registry.remove(udn) {
            tracing::info!("Device left: {}", udn);
            self.removed.push(udn.to_string());
        }
    }
}
