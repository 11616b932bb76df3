use thiserror::Error;

/// Errors surfaced by the browse orchestration engine.
///
/// Transient network conditions never appear here — they degrade into
/// empty results or absent events per the engine's error policy. These
/// variants cover misuse and lifecycle failures only.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Discovery subsystem failure (socket setup, multicast join)
    #[error("Discovery failed: {0}")]
    Discovery(#[from] dlna_discovery::DiscoveryError),

    /// SOAP round-trip failure surfaced synchronously
    #[error("Browse action failed: {0}")]
    Soap(#[from] content_directory::SoapError),

    /// Malformed host request (empty identifiers, bad envelope)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The engine has been shut down and no longer accepts work
    #[error("Browser has been shut down")]
    ShutDown,
}

/// Result type for browser operations
pub type Result<T> = std::result::Result<T, BrowserError>;
