//! Private SOAP client for ContentDirectory browsing
//!
//! This crate provides a minimal SOAP client for issuing the UPnP
//! ContentDirectory `Browse` action against a media server's control
//! endpoint. It is a blocking client: the round trip is meant to run on a
//! dedicated worker thread, never on a host or UI thread.

mod error;

pub use error::SoapError;

use std::time::Duration;
use xmltree::{Element, EmitterConfig};

/// Service type named in the SOAP action header and envelope.
pub const CONTENT_DIRECTORY_SERVICE_TYPE: &str =
    "urn:schemas-upnp-org:service:ContentDirectory:1";

/// Result of a `Browse` round trip.
#[derive(Debug, Clone)]
pub struct BrowseReply {
    /// The re-serialized `BrowseResponse` element, entity-encoded DIDL
    /// payload still inside its `Result` child
    pub document: String,
    /// Number of entries returned by this request
    pub number_returned: u32,
    /// Total entries under the browsed object
    pub total_matches: u32,
}

/// A minimal SOAP client for ContentDirectory communication
#[derive(Debug, Clone)]
pub struct ContentDirectoryClient {
    agent: ureq::Agent,
}

impl ContentDirectoryClient {
    /// Create a new client with default timeouts
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(10))
    }

    /// Create a new client with explicit connect/read timeouts
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect)
                .timeout_read(read)
                .build(),
        }
    }

    /// Issue a `Browse` action for the direct children of `object_id`.
    ///
    /// This is a synchronous, blocking round trip against the device's
    /// resolved control endpoint.
    pub fn browse(
        &self,
        control_url: &str,
        object_id: &str,
        starting_index: u32,
        requested_count: u32,
    ) -> Result<BrowseReply, SoapError> {
        let payload = format!(
            "<ObjectID>{}</ObjectID>\
             <BrowseFlag>BrowseDirectChildren</BrowseFlag>\
             <Filter>*</Filter>\
             <StartingIndex>{}</StartingIndex>\
             <RequestedCount>{}</RequestedCount>\
             <SortCriteria></SortCriteria>",
            escape_argument(object_id),
            starting_index,
            requested_count
        );

        let response = self.call(control_url, "Browse", &payload)?;
        BrowseReply::from_element(&response)
    }

    /// Send a SOAP request and return the parsed action-response element
    fn call(&self, control_url: &str, action: &str, payload: &str) -> Result<Element, SoapError> {
        // Inline SOAP envelope construction - no separate module needed
        let body = format!(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
                <s:Body>
                    <u:{action} xmlns:u="{service_uri}">
                        {payload}
                    </u:{action}>
                </s:Body>
            </s:Envelope>"#,
            action = action,
            service_uri = CONTENT_DIRECTORY_SERVICE_TYPE,
            payload = payload
        );

        let soap_action = format!("\"{}#{}\"", CONTENT_DIRECTORY_SERVICE_TYPE, action);

        let response = self
            .agent
            .post(control_url)
            .set("Content-Type", "text/xml; charset=\"utf-8\"")
            .set("SOAPACTION", &soap_action)
            .send_string(&body)
            .map_err(|e| SoapError::Network(e.to_string()))?;

        let xml_text = response
            .into_string()
            .map_err(|e| SoapError::Network(e.to_string()))?;

        let xml = Element::parse(xml_text.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        self.extract_response(&xml, action)
    }

    fn extract_response(&self, xml: &Element, action: &str) -> Result<Element, SoapError> {
        let body = xml
            .get_child("Body")
            .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

        // Check for SOAP fault first
        if let Some(fault) = body.get_child("Fault") {
            let error_code = fault
                .get_child("detail")
                .and_then(|d| d.get_child("UPnPError"))
                .and_then(|e| e.get_child("errorCode"))
                .and_then(|c| c.get_text())
                .and_then(|t| t.parse::<u16>().ok())
                .unwrap_or(500);
            return Err(SoapError::Fault(error_code));
        }

        let response_name = format!("{}Response", action);
        body.get_child(response_name.as_str())
            .cloned()
            .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
    }
}

impl Default for ContentDirectoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowseReply {
    fn from_element(response: &Element) -> Result<Self, SoapError> {
        Ok(Self {
            document: serialize_element(response)?,
            number_returned: child_count(response, "NumberReturned"),
            total_matches: child_count(response, "TotalMatches"),
        })
    }
}

/// Some servers omit or garble the count elements; treat those as zero
fn child_count(element: &Element, name: &str) -> u32 {
    element
        .get_child(name)
        .and_then(|c| c.get_text())
        .and_then(|t| t.trim().parse().ok())
        .unwrap_or(0)
}

fn serialize_element(element: &Element) -> Result<String, SoapError> {
    let mut out = Vec::new();
    let config = EmitterConfig::new().write_document_declaration(false);
    element
        .write_with_config(&mut out, config)
        .map_err(|e| SoapError::Parse(e.to_string()))?;
    String::from_utf8(out).map_err(|e| SoapError::Parse(e.to_string()))
}

/// Escape an action-argument value for embedding in the envelope
fn escape_argument(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
