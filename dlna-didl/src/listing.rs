//! DIDL-Lite listing extraction.
//!
//! Parses the DIDL-Lite payload of a browse response into normalized
//! entries: one per container or media item, with the resource URL picked
//! by protocolInfo. Entries missing an id, a title, or a recognized class
//! are skipped — servers advertise plenty of objects that are not ours to
//! display.

use serde::Deserialize;

use crate::error::{ParseError, ParseResult};

/// Classification of a listing entry, mirroring the upnp:class hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Image,
    Container,
}

impl MediaKind {
    /// Wire code used in structured browse responses
    pub fn code(self) -> i32 {
        match self {
            MediaKind::Video => 0,
            MediaKind::Audio => 1,
            MediaKind::Image => 2,
            MediaKind::Container => 3,
        }
    }

    fn from_class(class: &str) -> Option<Self> {
        if class.starts_with("object.item.videoItem") {
            Some(MediaKind::Video)
        } else if class.starts_with("object.item.audioItem") {
            Some(MediaKind::Audio)
        } else if class.starts_with("object.item.imageItem") {
            Some(MediaKind::Image)
        } else if class.starts_with("object.container") {
            Some(MediaKind::Container)
        } else {
            None
        }
    }
}

/// One normalized listing entry.
///
/// String fields are empty when the server did not provide them; hosts
/// treat empty as absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entry {
    pub object_id: String,
    pub title: String,
    pub kind: Option<MediaKind>,
    pub url: String,
    pub duration: String,
    pub date: String,
    pub size: String,
    pub resolution: String,
    pub subtitle: String,
    pub audio_url: String,
    pub artist: String,
    pub genre: String,
    pub album: String,
    pub album_artist: String,
    pub album_art_uri: String,
    pub original_track_number: String,
}

impl Entry {
    pub fn is_directory(&self) -> bool {
        self.kind == Some(MediaKind::Container)
    }
}

/// Parse a DIDL-Lite document into listing entries, containers first.
pub fn parse_listing(didl_xml: &str) -> ParseResult<Vec<Entry>> {
    let document: DidlDocument = quick_xml::de::from_str(didl_xml)
        .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))?;

    let mut entries = Vec::new();
    for object in &document.containers {
        if let Some(entry) = convert_object(object, true) {
            entries.push(entry);
        }
    }
    for object in &document.items {
        if let Some(entry) = convert_object(object, false) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn convert_object(object: &DidlObject, as_directory: bool) -> Option<Entry> {
    if object.id.is_empty() {
        return None;
    }
    let title = object.title.as_deref()?;
    let kind = MediaKind::from_class(object.class.as_deref()?)?;

    if as_directory && kind != MediaKind::Container {
        tracing::warn!("Unexpected class in container enumeration: {:?}", object.class);
    }

    let mut entry = Entry {
        object_id: object.id.clone(),
        title: title.to_string(),
        kind: Some(kind),
        date: object.date.clone().unwrap_or_default(),
        artist: object.artist.clone().unwrap_or_default(),
        genre: object.genre.clone().unwrap_or_default(),
        album: object.album.clone().unwrap_or_default(),
        album_artist: object.album_artist.clone().unwrap_or_default(),
        album_art_uri: object.album_art_uri.clone().unwrap_or_default(),
        original_track_number: object.original_track_number.clone().unwrap_or_default(),
        subtitle: object.caption().unwrap_or_default(),
        ..Entry::default()
    };

    if kind != MediaKind::Container {
        apply_resources(&mut entry, kind, &object.resources);
    }

    Some(entry)
}

/// Fold `res` elements into the entry by protocolInfo prefix.
fn apply_resources(entry: &mut Entry, kind: MediaKind, resources: &[DidlResource]) {
    for res in resources {
        let Some(protocol) = res.protocol_info.as_deref() else {
            continue;
        };
        let uri = res.uri.as_deref().unwrap_or("");

        if protocol.starts_with("http-get:*:video/") && kind == MediaKind::Video {
            entry.url = uri.to_string();
            entry.duration = res.duration.clone().unwrap_or_default();
            entry.size = res.size.clone().unwrap_or_default();
            entry.resolution = res.resolution.clone().unwrap_or_default();
            if let Some(subtitle) = &res.subtitle_file_uri {
                entry.subtitle = subtitle.clone();
            }
        } else if protocol.starts_with("http-get:*:image/") {
            match kind {
                MediaKind::Image => {
                    entry.url = uri.to_string();
                    entry.duration = res.duration.clone().unwrap_or_default();
                }
                MediaKind::Video | MediaKind::Audio => {
                    entry.album_art_uri = uri.to_string();
                }
                MediaKind::Container => {}
            }
        } else if protocol.starts_with("http-get:*:audio/") {
            if kind == MediaKind::Audio {
                entry.url = uri.to_string();
                entry.duration = res.duration.clone().unwrap_or_default();
            } else {
                entry.audio_url = uri.to_string();
            }
        }
    }
}

/// Pull the DIDL-Lite subtree out of a normalized browse document.
///
/// Browse responses nest the listing inside a `Result` element; after
/// normalization it is real markup. Returns the re-serialized `DIDL-Lite`
/// subtree, or `None` when the document has no listing.
pub fn extract_didl(document: &str) -> Option<String> {
    let root = xmltree::Element::parse(document.as_bytes()).ok()?;
    let didl = if root.name == "DIDL-Lite" {
        &root
    } else {
        find_didl(&root)?
    };

    let mut out = Vec::new();
    let config = xmltree::EmitterConfig::new().write_document_declaration(false);
    didl.write_with_config(&mut out, config).ok()?;
    String::from_utf8(out).ok()
}

fn find_didl(element: &xmltree::Element) -> Option<&xmltree::Element> {
    for child in &element.children {
        if let xmltree::XMLNode::Element(e) = child {
            if e.name == "DIDL-Lite" {
                return Some(e);
            }
            if let Some(found) = find_didl(e) {
                return Some(found);
            }
        }
    }
    None
}

/// DIDL-Lite root with both enumerations.
#[derive(Debug, Deserialize)]
struct DidlDocument {
    #[serde(rename = "container", default)]
    containers: Vec<DidlObject>,
    #[serde(rename = "item", default)]
    items: Vec<DidlObject>,
}

/// A `<container>` or `<item>` element. Element names keep their DIDL
/// namespace prefixes; quick-xml matches them literally.
#[derive(Debug, Deserialize)]
struct DidlObject {
    #[serde(rename = "@id", default)]
    id: String,
    #[serde(rename = "dc:title")]
    title: Option<String>,
    #[serde(rename = "upnp:class")]
    class: Option<String>,
    #[serde(rename = "dc:date")]
    date: Option<String>,
    #[serde(rename = "upnp:artist")]
    artist: Option<String>,
    #[serde(rename = "upnp:genre")]
    genre: Option<String>,
    #[serde(rename = "upnp:album")]
    album: Option<String>,
    #[serde(rename = "upnp:albumArtist")]
    album_artist: Option<String>,
    #[serde(rename = "upnp:albumArtURI")]
    album_art_uri: Option<String>,
    #[serde(rename = "upnp:originalTrackNumber")]
    original_track_number: Option<String>,
    #[serde(rename = "sec:CaptionInfo")]
    caption_info: Option<String>,
    #[serde(rename = "sec:CaptionInfoEx")]
    caption_info_ex: Option<String>,
    #[serde(rename = "pv:subtitlefile")]
    subtitle_file: Option<String>,
    #[serde(rename = "res", default)]
    resources: Vec<DidlResource>,
}

impl DidlObject {
    /// Element-level caption, in the order servers are known to fill them
    fn caption(&self) -> Option<String> {
        self.caption_info
            .clone()
            .or_else(|| self.caption_info_ex.clone())
            .or_else(|| self.subtitle_file.clone())
    }
}

#[derive(Debug, Deserialize)]
struct DidlResource {
    #[serde(rename = "@protocolInfo")]
    protocol_info: Option<String>,
    #[serde(rename = "@duration")]
    duration: Option<String>,
    #[serde(rename = "@size")]
    size: Option<String>,
    #[serde(rename = "@resolution")]
    resolution: Option<String>,
    #[serde(rename = "@pv:subtitleFileUri")]
    subtitle_file_uri: Option<String>,
    #[serde(rename = "$value")]
    uri: Option<String>,
}
