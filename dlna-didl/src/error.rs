use thiserror::Error;

/// Errors produced while parsing or normalizing DIDL documents
#[derive(Error, Debug)]
pub enum ParseError {
    /// serde deserialization of the XML failed
    #[error("XML deserialization failed: {0}")]
    XmlDeserializationFailed(String),

    /// The document could not be parsed as well-formed XML
    #[error("Document is not well-formed: {0}")]
    MalformedDocument(String),
}

/// Result type for DIDL parsing operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;
