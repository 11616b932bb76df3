//! JSON envelope codec for the host boundary.
//!
//! Hosts that speak JSON instead of linking the typed API send browse
//! requests as an envelope whose `arguments` field is itself a JSON-encoded
//! string, and receive a response envelope that echoes the request. Two
//! response shapes exist: version "1.0" carries the normalized document as
//! a single base64 payload, version "2.0" carries a structured listing of
//! entries.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};

use dlna_didl::{extract_didl, parse_listing, Entry, MediaKind};

use crate::error::{BrowserError, Result};
use crate::BrowseResult;

/// Method name stamped on every outbound envelope.
pub const RESPONSE_METHOD: &str = "DLNABrowseResponse";

/// Browse completed and the payload is valid.
pub const STATUS_OK: i32 = 0;
/// The device did not answer, or answered with nothing usable.
pub const STATUS_NO_RESPONSE: i32 = -1;
/// The response document could not be parsed into a listing.
pub const STATUS_PARSE_FAILED: i32 = -4;

/// Envelope versions understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    /// Response carries `[base64(document)]`
    V1,
    /// Response carries a structured entry listing
    V2,
}

impl ProtocolVersion {
    fn as_str(self) -> &'static str {
        match self {
            ProtocolVersion::V1 => "1.0",
            ProtocolVersion::V2 => "2.0",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "1.0" => Some(ProtocolVersion::V1),
            "2.0" => Some(ProtocolVersion::V2),
            _ => None,
        }
    }
}

/// A decoded inbound browse request.
///
/// Keeps the raw envelope so the response can echo it back in
/// `request_body`, which is how the host correlates responses with its own
/// outstanding requests.
#[derive(Debug, Clone)]
pub struct BrowseRequest {
    pub version: ProtocolVersion,
    pub udn: String,
    pub object_id: String,
    envelope: Value,
}

#[derive(Deserialize)]
struct RequestEnvelope {
    version: String,
    arguments: String,
}

#[derive(Deserialize)]
struct BrowseArguments {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    objid: String,
}

/// Decode an inbound request envelope.
///
/// The `arguments` field arrives as a JSON-encoded string, not a nested
/// object; existing hosts serialize it that way. Empty identifiers and
/// unknown versions are rejected here so nothing malformed ever reaches
/// the task slot.
pub fn decode_request(json_text: &str) -> Result<BrowseRequest> {
    let envelope: Value = serde_json::from_str(json_text)
        .map_err(|e| BrowserError::InvalidRequest(format!("Bad request envelope: {}", e)))?;

    let request: RequestEnvelope = serde_json::from_value(envelope.clone())
        .map_err(|e| BrowserError::InvalidRequest(format!("Bad request envelope: {}", e)))?;

    let version = ProtocolVersion::parse(&request.version).ok_or_else(|| {
        BrowserError::InvalidRequest(format!("Unsupported version {:?}", request.version))
    })?;

    let arguments: BrowseArguments = serde_json::from_str(&request.arguments)
        .map_err(|e| BrowserError::InvalidRequest(format!("Bad arguments: {}", e)))?;

    if arguments.uuid.is_empty() || arguments.objid.is_empty() {
        return Err(BrowserError::InvalidRequest(
            "Empty uuid or objid in browse request".to_string(),
        ));
    }

    Ok(BrowseRequest {
        version,
        udn: arguments.uuid,
        object_id: arguments.objid,
        envelope,
    })
}

/// Encode the response envelope for a completed browse.
///
/// An empty result document becomes a failed envelope with
/// [`STATUS_NO_RESPONSE`]. For version "2.0" the document is additionally
/// parsed into a structured listing; a document without a readable listing
/// becomes [`STATUS_PARSE_FAILED`].
pub fn encode_response(request: &BrowseRequest, result: &BrowseResult) -> String {
    if !result.is_success() {
        return encode_failure(request, STATUS_NO_RESPONSE);
    }

    match request.version {
        ProtocolVersion::V1 => encode_envelope(
            request,
            json!([BASE64.encode(result.document.as_bytes())]),
            STATUS_OK,
        ),
        ProtocolVersion::V2 => match listing_entries(&result.document) {
            Some(entries) => encode_envelope(
                request,
                Value::Array(entries.iter().map(entry_value).collect()),
                STATUS_OK,
            ),
            None => encode_failure(request, STATUS_PARSE_FAILED),
        },
    }
}

/// Encode a failed response envelope with the given negative status.
pub fn encode_failure(request: &BrowseRequest, status: i32) -> String {
    encode_envelope(request, Value::String(String::new()), status)
}

fn encode_envelope(request: &BrowseRequest, results: Value, status: i32) -> String {
    let response = json!({
        "version": request.version.as_str(),
        "method": RESPONSE_METHOD,
        "request_body": request.envelope,
        "results": results,
        "status": status,
    });
    response.to_string()
}

fn listing_entries(document: &str) -> Option<Vec<Entry>> {
    let didl = extract_didl(document)?;
    parse_listing(&didl).ok()
}

fn entry_value(entry: &Entry) -> Value {
    json!({
        "objid": entry.object_id,
        "filename": entry.title,
        "url": entry.url,
        "type": entry.kind.map(MediaKind::code).unwrap_or_default(),
        "date": entry.date,
        "duration": entry.duration,
        "size": entry.size,
        "resolution": entry.resolution,
        "subtitle": entry.subtitle,
        "audio": entry.audio_url,
        "genre": entry.genre,
        "album": entry.album,
        "albumArtist": entry.album_artist,
        "albumArtURI": entry.album_art_uri,
        "originalTrackNumber": entry.original_track_number,
    })
}
