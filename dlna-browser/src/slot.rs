//! Single-slot browse mailbox and worker wakeup word.
//!
//! Holds at most one pending browse request: submitting a new one discards
//! whatever was pending, because only the host's most recent navigation
//! target matters. The same lock carries the worker's shutdown and
//! rediscovery flags so one condition variable covers every wake reason.

use parking_lot::{Condvar, Mutex};

/// A browse request waiting for the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseTask {
    /// UDN of the target device
    pub udn: String,
    /// Object identifier of the folder to enumerate
    pub object_id: String,
}

/// Everything the worker learned from one wakeup.
pub(crate) struct Wake {
    pub shutdown: bool,
    pub rediscover: bool,
    pub task: Option<BrowseTask>,
}

struct SlotState {
    running: bool,
    rediscover: bool,
    pending: Option<BrowseTask>,
}

/// Latest-wins mailbox shared between host entry points and the worker.
pub struct TaskSlot {
    state: Mutex<SlotState>,
    wake: Condvar,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                running: true,
                rediscover: false,
                pending: None,
            }),
            wake: Condvar::new(),
        }
    }

    /// Replace the pending task and wake the worker.
    ///
    /// Returns the superseded task, if one was still waiting; it will never
    /// execute.
    pub fn submit(&self, task: BrowseTask) -> Option<BrowseTask> {
        let displaced = {
            let mut state = self.state.lock();
            state.pending.replace(task)
        };
        self.wake.notify_all();
        displaced
    }

    /// Remove and return the pending task, leaving the slot empty.
    pub fn take_pending(&self) -> Option<BrowseTask> {
        self.state.lock().pending.take()
    }

    /// Raise the rediscovery flag and wake the worker.
    pub fn request_rediscovery(&self) {
        self.state.lock().rediscover = true;
        self.wake.notify_all();
    }

    /// Stop the worker after its current step. Pending work is discarded.
    pub fn request_shutdown(&self) {
        self.state.lock().running = false;
        self.wake.notify_all();
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Worker side: block until shutdown, rediscovery, or a task arrives,
    /// then consume the signals atomically.
    pub(crate) fn next_wake(&self) -> Wake {
        let mut state = self.state.lock();
        while state.running && !state.rediscover && state.pending.is_none() {
            self.wake.wait(&mut state);
        }

        Wake {
            shutdown: !state.running,
            rediscover: std::mem::take(&mut state.rediscover),
            task: state.pending.take(),
        }
    }
}

impl Default for TaskSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(udn: &str, object_id: &str) -> BrowseTask {
        BrowseTask {
            udn: udn.to_string(),
            object_id: object_id.to_string(),
        }
    }

    #[test]
    fn test_submit_and_take() {
        let slot = TaskSlot::new();
        assert!(slot.take_pending().is_none());

        assert!(slot.submit(task("uuid:a", "0")).is_none());
        assert_eq!(slot.take_pending(), Some(task("uuid:a", "0")));
        assert!(slot.take_pending().is_none());
    }

    #[test]
    fn test_second_submit_displaces_first() {
        let slot = TaskSlot::new();
        slot.submit(task("uuid:a", "0"));
        let displaced = slot.submit(task("uuid:a", "64"));

        assert_eq!(displaced, Some(task("uuid:a", "0")));
        assert_eq!(slot.take_pending(), Some(task("uuid:a", "64")));
    }

    #[test]
    fn test_next_wake_returns_pending_task() {
        let slot = TaskSlot::new();
        slot.submit(task("uuid:a", "0"));

        let wake = slot.next_wake();
        assert!(!wake.shutdown);
        assert!(!wake.rediscover);
        assert_eq!(wake.task, Some(task("uuid:a", "0")));
    }

    #[test]
    fn test_next_wake_consumes_rediscover_once() {
        let slot = TaskSlot::new();
        slot.request_rediscovery();

        let wake = slot.next_wake();
        assert!(wake.rediscover);
        assert!(wake.task.is_none());

        // Flag was consumed; a queued task alone wakes without it
        slot.submit(task("uuid:a", "0"));
        let wake = slot.next_wake();
        assert!(!wake.rediscover);
        assert_eq!(wake.task, Some(task("uuid:a", "0")));
    }

    #[test]
    fn test_next_wake_observes_shutdown() {
        let slot = TaskSlot::new();
        slot.request_shutdown();

        let wake = slot.next_wake();
        assert!(wake.shutdown);
        assert!(!slot.is_running());
    }

    #[test]
    fn test_shutdown_wakes_blocked_worker() {
        use std::sync::Arc;

        let slot = Arc::new(TaskSlot::new());
        let worker_slot = Arc::clone(&slot);
        let handle = std::thread::spawn(move || worker_slot.next_wake().shutdown);

        // Give the thread a moment to block on the condvar
        std::thread::sleep(std::time::Duration::from_millis(50));
        slot.request_shutdown();

        assert!(handle.join().unwrap());
    }
}
