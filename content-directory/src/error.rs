use thiserror::Error;

/// Errors from ContentDirectory SOAP exchanges
#[derive(Error, Debug)]
pub enum SoapError {
    /// Network-level failure (connect, send, read)
    #[error("Network error: {0}")]
    Network(String),

    /// Response could not be parsed as a SOAP document
    #[error("Parse error: {0}")]
    Parse(String),

    /// The device returned a SOAP fault with a UPnP error code
    #[error("UPnP fault: error code {0}")]
    Fault(u16),
}
