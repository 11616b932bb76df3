//! DIDL-Lite parsing and normalization for DLNA browse responses
//!
//! Media servers return browse results as DIDL-Lite documents, frequently
//! over-escaped and salted with vendor quirks. This crate cleans those
//! documents up (one escaping level at a time, so the operation is
//! observable and terminates) and extracts structured listings from them.
//!
//! Two consumers, two shapes:
//! - [`normalize_document`] produces a validated, re-serialized document
//!   for hosts that want the raw markup;
//! - [`parse_listing`] produces typed [`Entry`] values for hosts that want
//!   a structured folder listing.

mod decode;
mod error;
mod listing;

pub use decode::{apply_vendor_quirks, decode_entities, normalize_document};
pub use error::{ParseError, ParseResult};
pub use listing::{extract_didl, parse_listing, Entry, MediaKind};
