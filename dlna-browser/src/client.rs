//! The network seam of the engine.
//!
//! Every network operation the engine performs goes through
//! [`DirectoryClient`], so tests can substitute scripted transports and the
//! rest of the engine never knows the difference. [`UpnpDirectoryClient`]
//! is the production implementation, composed from the discovery listener
//! and the SOAP browse client.

use std::sync::Arc;

use content_directory::ContentDirectoryClient;
use dlna_discovery::{DescriptionClient, DiscoveryListener};

use crate::config::BrowserConfig;
use crate::error::Result;

/// Network operations consumed by the engine.
///
/// `search` is fire-and-forget: results arrive asynchronously on the
/// discovery event stream. `resolve_description` and `browse` are blocking
/// round trips and are only ever called from the engine's own background
/// threads, never from the host's.
pub trait DirectoryClient: Send + Sync + 'static {
    /// Trigger a full-network search.
    fn search(&self) -> Result<()>;

    /// Fetch the description document at an advertised location.
    fn resolve_description(&self, location: &str) -> Result<String>;

    /// Execute a Browse round trip against a control endpoint, returning
    /// the raw response document.
    fn browse(&self, control_url: &str, object_id: &str) -> Result<String>;
}

/// Production client speaking SSDP, HTTP, and SOAP.
pub struct UpnpDirectoryClient {
    listener: Arc<DiscoveryListener>,
    descriptions: DescriptionClient,
    soap: ContentDirectoryClient,
    requested_count: u32,
}

impl UpnpDirectoryClient {
    pub fn new(listener: Arc<DiscoveryListener>, config: &BrowserConfig) -> Result<Self> {
        Ok(Self {
            listener,
            descriptions: DescriptionClient::new(config.description_timeout)?,
            soap: ContentDirectoryClient::with_timeouts(
                config.soap_connect_timeout,
                config.soap_read_timeout,
            ),
            requested_count: config.browse_requested_count,
        })
    }
}

impl DirectoryClient for UpnpDirectoryClient {
    fn search(&self) -> Result<()> {
        self.listener.search()?;
        Ok(())
    }

    fn resolve_description(&self, location: &str) -> Result<String> {
        Ok(self.descriptions.fetch(location)?)
    }

    fn browse(&self, control_url: &str, object_id: &str) -> Result<String> {
        let reply = self
            .soap
            .browse(control_url, object_id, 0, self.requested_count)?;
        tracing::debug!(
            "Browse of {} returned {}/{} entries",
            object_id,
            reply.number_returned,
            reply.total_matches
        );
        Ok(reply.document)
    }
}
