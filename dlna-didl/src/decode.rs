//! Entity decoding and vendor-quirk normalization.
//!
//! Media servers routinely return DIDL payloads with one escaping level too
//! many, multiplication-sign bytes where an "x" belongs in resolutions, and
//! vendor-namespace caption elements that confuse downstream consumers.
//! This module removes exactly one escaping level per call and applies the
//! documented quirk substitutions before a document is re-validated.

use xmltree::{Element, EmitterConfig};

/// Remove one level of XML entity escaping.
///
/// `&amp;` is replaced last so a doubly-escaped sequence like `&amp;lt;`
/// decodes to `&lt;` here and to `<` on the next call. Repeated application
/// reaches a fixed point once no replaceable substrings remain.
pub fn decode_entities(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Apply the documented vendor-quirk substitutions.
///
/// - multiplication-sign bytes (U+00D7) become an ASCII `x`, since several
///   servers use them inside `resolution` values
/// - the literal `<unknown>` placeholder some servers emit in metadata
///   fields becomes plain `unknown` so it cannot masquerade as markup
/// - `sec:` caption elements are stripped unless the manufacturer is the
///   namespace's own vendor; other servers copy them around half-filled
pub fn apply_vendor_quirks(input: &str, manufacturer: &str) -> String {
    let mut out = input.replace('\u{d7}', "x").replace("<unknown>", "unknown");

    if !manufacturer.contains("Samsung") {
        out = strip_element(&out, "sec:CaptionInfoEx");
        out = strip_element(&out, "sec:CaptionInfo");
    }

    out
}

/// Normalize a raw browse document: quirks + one decode pass, then a
/// parse/re-serialize round trip. Returns `None` when the cleaned text is
/// still not well-formed; callers deliver an empty result in that case.
pub fn normalize_document(raw: &str, manufacturer: &str) -> Option<String> {
    let cleaned = apply_vendor_quirks(&decode_entities(raw), manufacturer);

    let element = match Element::parse(cleaned.as_bytes()) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("Normalized document failed to parse: {}", e);
            return None;
        }
    };

    let mut out = Vec::new();
    let config = EmitterConfig::new().write_document_declaration(false);
    if let Err(e) = element.write_with_config(&mut out, config) {
        tracing::warn!("Failed to re-serialize document: {}", e);
        return None;
    }
    String::from_utf8(out).ok()
}

/// Remove every occurrence of the named element, self-closing or paired.
fn strip_element(input: &str, name: &str) -> String {
    let open = format!("<{}", name);
    let close = format!("</{}>", name);

    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;
    while let Some(found) = input[cursor..].find(&open) {
        let start = cursor + found;
        let after_name = start + open.len();

        // The match must be the whole tag name, not a prefix of a longer one
        let at_boundary = input[after_name..]
            .chars()
            .next()
            .map_or(false, |c| c == '>' || c == '/' || c.is_whitespace());
        if !at_boundary {
            out.push_str(&input[cursor..after_name]);
            cursor = after_name;
            continue;
        }

        let Some(gt) = input[after_name..].find('>') else {
            // Unterminated open tag; keep the rest untouched
            break;
        };
        let open_end = after_name + gt;

        let end = if input[..open_end].ends_with('/') {
            open_end + 1
        } else {
            match input[open_end..].find(&close) {
                Some(i) => open_end + i + close.len(),
                None => open_end + 1,
            }
        };

        out.push_str(&input[cursor..start]);
        cursor = end;
    }
    out.push_str(&input[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_removes_one_level() {
        assert_eq!(decode_entities("A &amp;amp; B"), "A &amp; B");
        assert_eq!(decode_entities("A &amp; B"), "A & B");
    }

    #[test]
    fn test_decode_fixed_point() {
        let once = decode_entities("A &amp;amp; B");
        let twice = decode_entities(&once);
        let thrice = decode_entities(&twice);
        assert_eq!(twice, "A & B");
        assert_eq!(thrice, twice);
    }

    #[test]
    fn test_decode_all_entities() {
        assert_eq!(
            decode_entities("&lt;a b=&quot;c&quot;&gt;&apos;d&apos;&lt;/a&gt;"),
            "<a b=\"c\">'d'</a>"
        );
    }

    #[test]
    fn test_double_escaped_markup_decodes_stepwise() {
        // One level per call: &amp;lt; -> &lt; -> <
        assert_eq!(decode_entities("&amp;lt;x&amp;gt;"), "&lt;x&gt;");
        assert_eq!(decode_entities("&lt;x&gt;"), "<x>");
    }

    #[test]
    fn test_multiplication_sign_quirk() {
        assert_eq!(
            apply_vendor_quirks("resolution=\"1920\u{d7}1080\"", "Acme"),
            "resolution=\"1920x1080\""
        );
    }

    #[test]
    fn test_unknown_placeholder_quirk() {
        assert_eq!(
            apply_vendor_quirks("<genre><unknown></genre>", "Acme"),
            "<genre>unknown</genre>"
        );
    }

    #[test]
    fn test_caption_stripped_for_other_vendors() {
        let input = "<item><sec:CaptionInfo sec:type=\"srt\">x.srt</sec:CaptionInfo><dc:title>T</dc:title></item>";
        assert_eq!(
            apply_vendor_quirks(input, "Acme"),
            "<item><dc:title>T</dc:title></item>"
        );
    }

    #[test]
    fn test_caption_kept_for_reference_vendor() {
        let input = "<item><sec:CaptionInfo>x.srt</sec:CaptionInfo></item>";
        assert_eq!(apply_vendor_quirks(input, "Samsung Electronics"), input);
    }

    #[test]
    fn test_strip_element_self_closing() {
        assert_eq!(
            strip_element("<a><sec:CaptionInfo/><b/></a>", "sec:CaptionInfo"),
            "<a><b/></a>"
        );
    }

    #[test]
    fn test_strip_element_does_not_match_longer_names() {
        let input = "<sec:CaptionInfoEx>y</sec:CaptionInfoEx>";
        assert_eq!(strip_element(input, "sec:CaptionInfo"), input);
    }

    #[test]
    fn test_normalize_escaped_result_payload() {
        let raw = "<BrowseResponse><Result>&lt;DIDL-Lite&gt;&lt;item id=\"1\"/&gt;&lt;/DIDL-Lite&gt;</Result></BrowseResponse>";
        let normalized = normalize_document(raw, "Acme").unwrap();
        assert!(normalized.contains("<DIDL-Lite>"));
        assert!(normalized.contains("</BrowseResponse>"));
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        assert!(normalize_document("<a><b></a>", "Acme").is_none());
        assert!(normalize_document("not xml at all", "Acme").is_none());
    }
}
