//! Configuration for the browse orchestration engine.

use std::time::Duration;

use crate::error::{BrowserError, Result};

/// Configuration for a [`DlnaBrowser`](crate::DlnaBrowser).
///
/// Defaults match the behavior of the reference control point: media-server
/// search target, short SOAP timeouts sized for LAN round trips, and a
/// request count large enough that a folder fits in one browse exchange.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// SSDP search target for full-network discovery
    /// Default: `urn:schemas-upnp-org:device:MediaServer:1`
    pub search_target: String,

    /// MX value (seconds) advertised in M-SEARCH requests
    /// Default: 2
    pub search_mx: u32,

    /// Timeout for fetching a device description document
    /// Default: 3 seconds
    pub description_timeout: Duration,

    /// SOAP connect timeout
    /// Default: 5 seconds
    pub soap_connect_timeout: Duration,

    /// SOAP read timeout
    /// Default: 10 seconds
    pub soap_read_timeout: Duration,

    /// RequestedCount sent with each Browse action. Some servers treat 0 as
    /// "nothing" rather than "no limit", so this stays explicit.
    /// Default: 10000
    pub browse_requested_count: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            search_target: dlna_discovery::MEDIA_SERVER_DEVICE_TYPE.to_string(),
            search_mx: 2,
            description_timeout: Duration::from_secs(3),
            soap_connect_timeout: Duration::from_secs(5),
            soap_read_timeout: Duration::from_secs(10),
            browse_requested_count: 10000,
        }
    }
}

impl BrowserConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.search_target.is_empty() {
            return Err(BrowserError::Configuration(
                "Search target must not be empty".to_string(),
            ));
        }

        if self.browse_requested_count == 0 {
            return Err(BrowserError::Configuration(
                "Browse requested count must be greater than 0".to_string(),
            ));
        }

        if self.description_timeout == Duration::ZERO
            || self.soap_connect_timeout == Duration::ZERO
            || self.soap_read_timeout == Duration::ZERO
        {
            return Err(BrowserError::Configuration(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_search_target(mut self, target: impl Into<String>) -> Self {
        self.search_target = target.into();
        self
    }

    pub fn with_soap_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.soap_connect_timeout = connect;
        self.soap_read_timeout = read;
        self
    }

    pub fn with_description_timeout(mut self, timeout: Duration) -> Self {
        self.description_timeout = timeout;
        self
    }

    pub fn with_browse_requested_count(mut self, count: u32) -> Self {
        self.browse_requested_count = count;
        self
    }
}
