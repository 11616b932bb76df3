//! Thread-safe registry of discovered devices.
//!
//! One mutex over one map. Every operation is a short critical section;
//! callers never hold the lock across network calls or callbacks, and
//! consumers always receive copies of records, never references into the
//! map.

use std::collections::HashMap;

use parking_lot::Mutex;

use dlna_discovery::Device;

/// Mapping from device UDN to its record.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: Mutex<HashMap<String, Device>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a device if its UDN is not already registered.
    ///
    /// Returns `true` when the record was inserted. A collision is a no-op:
    /// re-announcements never clobber an existing record. Use
    /// [`set_location`](Self::set_location) to refine an endpoint in place.
    pub fn upsert(&self, device: Device) -> bool {
        let mut devices = self.devices.lock();
        if devices.contains_key(&device.udn) {
            return false;
        }
        devices.insert(device.udn.clone(), device);
        true
    }

    /// Replace the control endpoint of an existing record.
    pub fn set_location(&self, udn: &str, location: &str) -> bool {
        let mut devices = self.devices.lock();
        match devices.get_mut(udn) {
            Some(device) => {
                device.location = location.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove a record, returning whether it was present.
    pub fn remove(&self, udn: &str) -> bool {
        self.devices.lock().remove(udn).is_some()
    }

    /// Copy of the record for the given UDN, if registered.
    pub fn lookup(&self, udn: &str) -> Option<Device> {
        self.devices.lock().get(udn).cloned()
    }

    pub fn contains(&self, udn: &str) -> bool {
        self.devices.lock().contains_key(udn)
    }

    /// Drop every record. Used when a fresh full-network search begins and
    /// prior results may be stale.
    pub fn reset(&self) {
        self.devices.lock().clear();
    }

    /// Copies of all registered records.
    pub fn devices(&self) -> Vec<Device> {
        self.devices.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.devices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlna_discovery::DeviceClass;

    fn device(udn: &str, location: &str) -> Device {
        Device {
            udn: udn.to_string(),
            friendly_name: "NAS".to_string(),
            location: location.to_string(),
            icon_url: String::new(),
            manufacturer: "Acme".to_string(),
            class: DeviceClass::MediaServer,
        }
    }

    #[test]
    fn test_upsert_and_lookup() {
        let registry = DeviceRegistry::new();
        assert!(registry.upsert(device("uuid:a", "http://10.0.0.5:80/ctl")));
        assert_eq!(registry.len(), 1);

        let found = registry.lookup("uuid:a").unwrap();
        assert_eq!(found.location, "http://10.0.0.5:80/ctl");
        assert!(registry.lookup("uuid:b").is_none());
    }

    #[test]
    fn test_upsert_collision_is_noop() {
        let registry = DeviceRegistry::new();
        assert!(registry.upsert(device("uuid:a", "http://10.0.0.5:80/ctl")));
        assert!(!registry.upsert(device("uuid:a", "http://10.9.9.9:80/other")));

        assert_eq!(
            registry.lookup("uuid:a").unwrap().location,
            "http://10.0.0.5:80/ctl"
        );
    }

    #[test]
    fn test_set_location_refines_in_place() {
        let registry = DeviceRegistry::new();
        registry.upsert(device("uuid:a", "http://10.0.0.5:80/desc.xml"));

        assert!(registry.set_location("uuid:a", "http://10.0.0.5:80/ctl/ContentDir"));
        assert_eq!(
            registry.lookup("uuid:a").unwrap().location,
            "http://10.0.0.5:80/ctl/ContentDir"
        );

        assert!(!registry.set_location("uuid:missing", "http://x/"));
    }

    #[test]
    fn test_remove() {
        let registry = DeviceRegistry::new();
        registry.upsert(device("uuid:a", "http://10.0.0.5:80/ctl"));

        assert!(registry.remove("uuid:a"));
        assert!(!registry.remove("uuid:a"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let registry = DeviceRegistry::new();
        registry.upsert(device("uuid:a", "http://10.0.0.5:80/ctl"));
        registry.upsert(device("uuid:b", "http://10.0.0.6:80/ctl"));

        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.lookup("uuid:a").is_none());
    }

    #[test]
    fn test_lookup_returns_a_copy() {
        let registry = DeviceRegistry::new();
        registry.upsert(device("uuid:a", "http://10.0.0.5:80/ctl"));

        let mut copy = registry.lookup("uuid:a").unwrap();
        copy.location = "http://tampered/".to_string();

        assert_eq!(
            registry.lookup("uuid:a").unwrap().location,
            "http://10.0.0.5:80/ctl"
        );
    }

    #[test]
    fn test_found_left_sequences_leave_exact_set() {
        let registry = DeviceRegistry::new();
        for udn in ["uuid:a", "uuid:b", "uuid:c"] {
            registry.upsert(device(udn, "http://x/ctl"));
        }
        registry.remove("uuid:b");
        registry.upsert(device("uuid:a", "http://x/ctl"));
        registry.remove("uuid:missing");

        let mut udns: Vec<String> = registry.devices().into_iter().map(|d| d.udn).collect();
        udns.sort();
        assert_eq!(udns, vec!["uuid:a".to_string(), "uuid:c".to_string()]);
    }
}
