//! The dedicated browse worker loop.
//!
//! The only thread that invokes browse round trips or triggers rediscovery.
//! It blocks on the task slot's condition variable between iterations, so a
//! browse in flight always runs to completion; cancellation only ever
//! applies to tasks still waiting in the slot.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::client::DirectoryClient;
use crate::queue::EventQueue;
use crate::registry::DeviceRegistry;
use crate::slot::{BrowseTask, TaskSlot};
use crate::BrowseResult;

pub(crate) struct Worker {
    pub registry: Arc<DeviceRegistry>,
    pub slot: Arc<TaskSlot>,
    pub results: Arc<EventQueue<BrowseResult>>,
    pub client: Arc<dyn DirectoryClient>,
}

impl Worker {
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    fn run(&self) {
        tracing::info!("Browse worker started");

        loop {
            let wake = self.slot.next_wake();
            if wake.shutdown {
                break;
            }

            if wake.rediscover {
                tracing::info!("Rediscovering: resetting registry and searching");
                self.registry.reset();
                if let Err(e) = self.client.search() {
                    tracing::warn!("Search trigger failed: {}", e);
                }
            }

            if let Some(task) = wake.task {
                self.run_browse(task);
            }
        }

        tracing::info!("Browse worker stopped");
    }

    fn run_browse(&self, task: BrowseTask) {
        // The target may have vanished between submission and pickup;
        // that is a stale task, not an error
        let Some(device) = self.registry.lookup(&task.udn) else {
            tracing::debug!("Dropping browse for vanished device {}", task.udn);
            return;
        };

        tracing::info!(
            "Browsing object {} on {} at {}",
            task.object_id,
            device.friendly_name,
            device.location
        );

        let document = match self.client.browse(&device.location, &task.object_id) {
            Ok(raw) => {
                dlna_didl::normalize_document(&raw, &device.manufacturer).unwrap_or_default()
            }
            Err(e) => {
                tracing::warn!("Browse failed on {}: {}", device.friendly_name, e);
                String::new()
            }
        };

        self.results.push(BrowseResult {
            udn: task.udn,
            object_id: task.object_id,
            document,
        });
    }
}
