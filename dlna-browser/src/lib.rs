//! Discovery-and-browse orchestration engine for polling hosts
//!
//! This crate ties the DLNA collaborator crates together into an engine a
//! host application can poll from a single thread: devices discovered on
//! the network land in a thread-safe registry, browse requests coalesce
//! into a single pending slot served by a dedicated worker thread, and all
//! results cross back to the host exclusively through [`DlnaBrowser::drain`].
//!
//! The host never receives a callback from a network thread; it calls
//! `drain()` at its own cadence and gets its callbacks invoked there, in
//! FIFO order per event queue.
//!
//! # Quick Start
//!
//! ```no_run
//! use dlna_browser::{BrowserCallbacks, BrowserConfig, DlnaBrowser};
//!
//! let mut browser = DlnaBrowser::new(BrowserConfig::default()).unwrap();
//! browser.register_callbacks(
//!     BrowserCallbacks::new()
//!         .on_device_added(|device| println!("found {}", device.friendly_name))
//!         .on_device_removed(|udn| println!("lost {}", udn))
//!         .on_browse_completed(|result| println!("{} bytes", result.document.len())),
//! );
//!
//! browser.submit_browse("uuid:4d696e69-444c", "0").unwrap();
//!
//! loop {
//!     // Once per host frame/tick
//!     browser.drain();
//!     std::thread::sleep(std::time::Duration::from_millis(16));
//! }
//! ```

mod bridge;
mod browser;
mod client;
mod config;
mod error;
mod ingest;
pub mod protocol;
mod queue;
mod registry;
mod slot;
mod worker;

pub use bridge::BrowserCallbacks;
pub use browser::DlnaBrowser;
pub use client::{DirectoryClient, UpnpDirectoryClient};
pub use config::BrowserConfig;
pub use error::{BrowserError, Result};
pub use registry::DeviceRegistry;
pub use slot::BrowseTask;

// The device model comes from the discovery crate; re-exported so hosts
// only need this crate in scope.
pub use dlna_discovery::{Device, DeviceClass, DiscoveryEvent};

/// A completed browse, queued for delivery to the host.
///
/// `document` is the normalized browse response, or empty when the round
/// trip or normalization failed. Each result is delivered exactly once
/// through the `browse_completed` callback.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseResult {
    /// UDN of the browsed device
    pub udn: String,
    /// Object identifier of the browsed folder
    pub object_id: String,
    /// Normalized response document, empty on failure
    pub document: String,
}

impl BrowseResult {
    /// Whether the browse produced a usable document.
    pub fn is_success(&self) -> bool {
        !self.document.is_empty()
    }
}
