//! Background listener thread delivering discovery events.
//!
//! Spawns a dedicated receive loop over the SSDP socket and forwards
//! parsed events to the consumer over a standard mpsc channel. The
//! consumer decides what to do with announcements; this thread never
//! touches device state itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::Result;
use crate::ssdp::SsdpSocket;
use crate::DiscoveryEvent;

/// How long a blocked receive waits before re-checking the shutdown flag.
const RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Handle to the background SSDP listener.
///
/// The receive loop runs until `shutdown()` is called (or the handle is
/// dropped) or until the event receiver goes away. `search()` may be called
/// from any thread; results arrive asynchronously through the channel the
/// listener was spawned with.
pub struct DiscoveryListener {
    socket: Arc<SsdpSocket>,
    shutdown: Arc<AtomicBool>,
    search_target: String,
    search_mx: u32,
    _thread: JoinHandle<()>,
}

impl DiscoveryListener {
    /// Bind the SSDP socket and start the receive loop.
    pub fn spawn(
        search_target: &str,
        search_mx: u32,
        tx: mpsc::Sender<DiscoveryEvent>,
    ) -> Result<Self> {
        let socket = Arc::new(SsdpSocket::new(RECV_TIMEOUT)?);
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread = {
            let socket = Arc::clone(&socket);
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || run_recv_loop(socket, shutdown, tx))
        };

        Ok(Self {
            socket,
            shutdown,
            search_target: search_target.to_string(),
            search_mx,
            _thread: thread,
        })
    }

    /// Send an M-SEARCH for the configured target.
    ///
    /// Fire-and-forget: responses surface later as `Alive` events on the
    /// listener's channel.
    pub fn search(&self) -> Result<()> {
        tracing::info!("Searching for {}", self.search_target);
        self.socket.search(&self.search_target, self.search_mx)
    }

    /// Ask the receive loop to exit after its current read.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for DiscoveryListener {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

fn run_recv_loop(
    socket: Arc<SsdpSocket>,
    shutdown: Arc<AtomicBool>,
    tx: mpsc::Sender<DiscoveryEvent>,
) {
    tracing::info!("SSDP listener started");
    let mut buf = [0u8; 8192];

    while !shutdown.load(Ordering::Relaxed) {
        match socket.recv_event(&mut buf) {
            Ok(Some(event)) => {
                tracing::debug!("SSDP event: {:?}", event);
                if tx.send(event).is_err() {
                    tracing::debug!("Event receiver dropped, stopping SSDP listener");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("SSDP receive error: {}", e);
            }
        }
    }

    tracing::info!("SSDP listener stopped");
}
