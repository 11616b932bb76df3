//! The engine context object.
//!
//! A [`DlnaBrowser`] owns every shared structure of the engine: the device
//! registry, the change and result queues, the browse task slot, the
//! callback handles, and the background threads. Hosts construct one at
//! startup, keep it for the lifetime of the module, and poll it from a
//! single thread.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::bridge::BrowserCallbacks;
use crate::client::{DirectoryClient, UpnpDirectoryClient};
use crate::config::BrowserConfig;
use crate::error::{BrowserError, Result};
use crate::ingest::EventIngestor;
use crate::protocol;
use crate::queue::EventQueue;
use crate::registry::DeviceRegistry;
use crate::slot::{BrowseTask, TaskSlot};
use crate::worker::Worker;
use crate::BrowseResult;

use dlna_discovery::{Device, DiscoveryEvent, DiscoveryListener};

/// Discovery-and-browse engine for a polling host.
///
/// All mutation entry points are safe to call from any thread; delivery of
/// results happens only inside [`drain`](Self::drain), which the host must
/// call from a single thread of its choosing.
pub struct DlnaBrowser {
    registry: Arc<DeviceRegistry>,
    added: Arc<EventQueue<Device>>,
    removed: Arc<EventQueue<String>>,
    results: Arc<EventQueue<BrowseResult>>,
    slot: Arc<TaskSlot>,
    callbacks: BrowserCallbacks,

    listener: Option<Arc<DiscoveryListener>>,
    worker: Option<JoinHandle<()>>,
    _ingestor: JoinHandle<()>,
}

impl DlnaBrowser {
    /// Start the engine: bind the SSDP socket, spawn the listener,
    /// ingestor, and worker threads, and trigger the initial full-network
    /// search.
    pub fn new(config: BrowserConfig) -> Result<Self> {
        config.validate()?;

        let (tx, rx) = mpsc::channel();
        let listener = Arc::new(DiscoveryListener::spawn(
            &config.search_target,
            config.search_mx,
            tx,
        )?);
        let client = Arc::new(UpnpDirectoryClient::new(Arc::clone(&listener), &config)?);

        let mut browser = Self::assemble(client, rx);
        browser.listener = Some(listener);

        // Initial population happens through the normal rediscovery path,
        // on the worker thread
        browser.slot.request_rediscovery();
        Ok(browser)
    }

    /// Start the engine on a caller-supplied transport and event stream.
    ///
    /// No SSDP socket is bound and no initial search is triggered; the
    /// caller feeds `events` and decides when to call
    /// [`refresh`](Self::refresh). Tests and hosts embedding their own
    /// discovery plumbing use this entry point.
    pub fn with_client(
        config: BrowserConfig,
        client: Arc<dyn DirectoryClient>,
        events: mpsc::Receiver<DiscoveryEvent>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(client, events))
    }

    fn assemble(
        client: Arc<dyn DirectoryClient>,
        events: mpsc::Receiver<DiscoveryEvent>,
    ) -> Self {
        let registry = Arc::new(DeviceRegistry::new());
        let added = Arc::new(EventQueue::new());
        let removed = Arc::new(EventQueue::new());
        let results = Arc::new(EventQueue::new());
        let slot = Arc::new(TaskSlot::new());

        let ingestor = EventIngestor {
            registry: Arc::clone(&registry),
            added: Arc::clone(&added),
            removed: Arc::clone(&removed),
            client: Arc::clone(&client),
        }
        .spawn(events);

        let worker = Worker {
            registry: Arc::clone(&registry),
            slot: Arc::clone(&slot),
            results: Arc::clone(&results),
            client,
        }
        .spawn();

        Self {
            registry,
            added,
            removed,
            results,
            slot,
            callbacks: BrowserCallbacks::new(),
            listener: None,
            worker: Some(worker),
            _ingestor: ingestor,
        }
    }

    /// Install the host's callback handles.
    ///
    /// Replaces any previously registered set. Events queued before
    /// registration are delivered to the new handles on the next drain.
    pub fn register_callbacks(&mut self, callbacks: BrowserCallbacks) {
        self.callbacks = callbacks;
    }

    /// Request a fresh full-network search.
    ///
    /// The registry is cleared before the search goes out, since prior
    /// results may be stale; devices re-announce themselves and repopulate
    /// it through the normal discovery path.
    pub fn refresh(&self) {
        self.slot.request_rediscovery();
    }

    /// Submit a browse request for a folder on a device.
    ///
    /// At most one request is pending at a time: a submission while another
    /// request waits discards the older one without executing it. The
    /// result arrives through the `browse_completed` callback on a later
    /// [`drain`](Self::drain).
    pub fn submit_browse(&self, udn: &str, object_id: &str) -> Result<()> {
        if udn.is_empty() || object_id.is_empty() {
            return Err(BrowserError::InvalidRequest(
                "Empty device or object identifier".to_string(),
            ));
        }
        if !self.slot.is_running() {
            return Err(BrowserError::ShutDown);
        }

        let displaced = self.slot.submit(BrowseTask {
            udn: udn.to_string(),
            object_id: object_id.to_string(),
        });
        if let Some(task) = displaced {
            tracing::debug!(
                "Superseded pending browse of {} on {}",
                task.object_id,
                task.udn
            );
        }
        Ok(())
    }

    /// Decode a JSON request envelope and submit it.
    ///
    /// Returns the decoded request so the host can encode the matching
    /// response envelope (see [`protocol::encode_response`]) when the
    /// `browse_completed` callback fires.
    pub fn submit_browse_json(&self, json: &str) -> Result<protocol::BrowseRequest> {
        let request = protocol::decode_request(json)?;
        self.submit_browse(&request.udn, &request.object_id)?;
        Ok(request)
    }

    /// Deliver all pending events to the registered callbacks.
    ///
    /// Must only be called from the host's own thread, never concurrently
    /// with itself. Drains the added-device queue, then the removed-device
    /// queue, then the browse-result queue, invoking the matching callback
    /// once per entry in FIFO order. Returns the number of events
    /// delivered.
    pub fn drain(&mut self) -> usize {
        let mut delivered = 0;

        for device in self.added.drain_all() {
            delivered += 1;
            if let Some(callback) = self.callbacks.device_added.as_mut() {
                callback(&device);
            }
        }

        for udn in self.removed.drain_all() {
            delivered += 1;
            if let Some(callback) = self.callbacks.device_removed.as_mut() {
                callback(&udn);
            }
        }

        for result in self.results.drain_all() {
            delivered += 1;
            if let Some(callback) = self.callbacks.browse_completed.as_mut() {
                callback(&result);
            }
        }

        delivered
    }

    /// Copies of all currently registered devices.
    pub fn devices(&self) -> Vec<Device> {
        self.registry.devices()
    }

    /// Copy of one device record, if registered.
    pub fn device(&self, udn: &str) -> Option<Device> {
        self.registry.lookup(udn)
    }

    /// Stop the engine.
    ///
    /// Wakes the worker, which exits after completing any in-flight step;
    /// the SSDP listener and ingestor wind down behind it. Pending queue
    /// contents are discarded, not flushed. Idempotent, and also runs on
    /// drop.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        tracing::info!("Shutting down browse engine");
        self.slot.request_shutdown();
        if let Some(listener) = &self.listener {
            listener.shutdown();
        }
        if worker.join().is_err() {
            tracing::warn!("Browse worker exited abnormally");
        }
    }
}

impl Drop for DlnaBrowser {
    fn drop(&mut self) {
        self.shutdown();
    }
}
