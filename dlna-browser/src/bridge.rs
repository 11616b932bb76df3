//! Typed callback handles invoked from the poll/drain bridge.

use dlna_discovery::Device;

use crate::BrowseResult;

/// Host callbacks delivered during [`drain`](crate::DlnaBrowser::drain).
///
/// Handles are registered on the context object and only ever invoked on
/// the thread that calls `drain`, so hosts with single-threaded callback
/// contracts need no synchronization of their own. Unset handles simply
/// skip their events.
#[derive(Default)]
pub struct BrowserCallbacks {
    pub(crate) device_added: Option<Box<dyn FnMut(&Device) + Send>>,
    pub(crate) device_removed: Option<Box<dyn FnMut(&str) + Send>>,
    pub(crate) browse_completed: Option<Box<dyn FnMut(&BrowseResult) + Send>>,
}

impl BrowserCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per newly registered device, in discovery order.
    pub fn on_device_added(mut self, f: impl FnMut(&Device) + Send + 'static) -> Self {
        self.device_added = Some(Box::new(f));
        self
    }

    /// Called once per departed device with its UDN.
    pub fn on_device_removed(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.device_removed = Some(Box::new(f));
        self
    }

    /// Called once per completed browse; the result document is empty when
    /// the round trip or normalization failed.
    pub fn on_browse_completed(mut self, f: impl FnMut(&BrowseResult) + Send + 'static) -> Self {
        self.browse_completed = Some(Box::new(f));
        self
    }
}
