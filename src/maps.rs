//! Salvaging a usable Google Maps embed URL out of a free-form
//! spreadsheet cell.
//!
//! Cells arrive as pasted `<iframe>` snippets, HTML-escaped fragments of
//! them, bare `embed?pb=` URLs, or plain links, often truncated or
//! wrapped in stray quotes by the sheet editor. This is defensive text
//! salvage over known markers, not parsing against a grammar; a cell that
//! yields nothing usable simply renders without a map.

use serde::{Deserialize, Serialize};
use url::Url;

const EMBED_BASE: &str = "https://www.google.com/maps/embed?pb=";

/// A usable map embed plus the matching "open in Google Maps" link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEmbed {
    pub embed_url: String,
    pub open_url: String,
}

/// Extract a map embed from a raw cell, if anything usable survives.
#[must_use]
pub fn salvage_map_embed(raw: &str) -> Option<MapEmbed> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let looks_like_iframe = contains_ascii_ci(raw, "<iframe")
        || contains_ascii_ci(raw, "&lt;iframe")
        || contains_ascii_ci(raw, "embed?pb=");

    if looks_like_iframe {
        if let Some(pb) = extract_pb_payload(raw) {
            let embed_url = format!("{EMBED_BASE}{pb}");
            return finish(embed_url.replace("/embed?pb=", "/?pb="), embed_url);
        }
    }

    // Last resort either way: the first bare URL in the cell.
    let candidate = extract_bare_url(raw)?;
    let open_url = if candidate.contains("/embed") {
        candidate.replace("/embed", "")
    } else {
        candidate.clone()
    };
    finish(open_url, candidate)
}

fn finish(open_url: String, embed_url: String) -> Option<MapEmbed> {
    if Url::parse(&embed_url).is_err() {
        tracing::debug!(cell_url = %embed_url, "discarding unparseable salvaged map url");
        return None;
    }
    Some(MapEmbed { embed_url, open_url })
}

/// The `pb=` payload: the run of parameter-safe characters after the
/// marker, with escape debris scrubbed off.
fn extract_pb_payload(raw: &str) -> Option<String> {
    let start = find_ascii_ci(raw, "pb=")? + "pb=".len();
    let run: String = raw[start..]
        .chars()
        .take_while(|&c| is_pb_char(c))
        .collect();
    let cleaned = scrub_payload(&run);
    (!cleaned.is_empty()).then_some(cleaned)
}

fn is_pb_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '!' | '%' | '-' | '_' | '.')
}

/// Strip the debris HTML-escaping leaves behind and truncate at the first
/// stray quote or `=`.
fn scrub_payload(value: &str) -> String {
    let value = value
        .replace("&quot;", "")
        .replace("&amp;", "&")
        .replace("\"\"", "")
        .replace('"', "");
    value
        .split('=')
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

fn extract_bare_url(raw: &str) -> Option<String> {
    let start = find_ascii_ci(raw, "https://").or_else(|| find_ascii_ci(raw, "http://"))?;
    let run: String = raw[start..]
        .chars()
        .take_while(|&c| !c.is_whitespace() && !matches!(c, '"' | '\'' | '>'))
        .collect();
    let cleaned = run
        .replace("&quot;", "")
        .replace("&amp;", "&")
        .replace("\"\"", "")
        .trim()
        .to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn contains_ascii_ci(haystack: &str, needle: &str) -> bool {
    find_ascii_ci(haystack, needle).is_some()
}

/// Byte-wise ASCII-case-insensitive find. Needles are ASCII, so a match
/// can only begin on a character boundary.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    h.windows(n.len()).position(|w| w.eq_ignore_ascii_case(n))
}
