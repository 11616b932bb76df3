//! Error types for the discovery system.

use std::fmt;

/// Error type for discovery operations.
///
/// Represents the failure modes of SSDP presence and description
/// resolution: socket and HTTP errors, malformed documents, and timeouts.
#[derive(Debug)]
pub enum DiscoveryError {
    /// Network-related errors (socket creation, multicast join, HTTP requests)
    NetworkError(String),
    /// Parsing errors (description XML, SSDP datagram)
    ParseError(String),
    /// Operation timed out waiting for responses
    Timeout,
    /// Description fetched but unusable (missing UDN, name, or service)
    InvalidDescription(String),
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DiscoveryError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DiscoveryError::Timeout => write!(f, "Operation timed out"),
            DiscoveryError::InvalidDescription(msg) => write!(f, "Invalid description: {}", msg),
        }
    }
}

impl std::error::Error for DiscoveryError {}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
