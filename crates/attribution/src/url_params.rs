//! Best-effort extraction of key/value pairs from deep-link URLs.
//!
//! Query and fragment are parsed independently. Nothing here fails: a
//! malformed or missing segment simply yields an empty map.

use std::collections::HashMap;

/// Parameters found between the first `?` and the first `#` (or the end).
pub fn parse_query(url: &str) -> HashMap<String, String> {
    query_segment(url).map(parse_pairs).unwrap_or_default()
}

/// Parameters found after the first `#`.
pub fn parse_fragment(url: &str) -> HashMap<String, String> {
    fragment_segment(url).map(parse_pairs).unwrap_or_default()
}

fn query_segment(url: &str) -> Option<&str> {
    let before_fragment = match url.trim().split_once('#') {
        Some((head, _)) => head,
        None => url.trim(),
    };
    before_fragment.split_once('?').map(|(_, query)| query)
}

fn fragment_segment(url: &str) -> Option<&str> {
    url.trim().split_once('#').map(|(_, fragment)| fragment)
}

/// Split on `&`, then on the first `=`, percent-decoding both sides. Keys are
/// lower-cased so lookups are case-insensitive; a repeated key keeps its last
/// value.
fn parse_pairs(segment: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(segment.as_bytes())
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_lowercase(), value.into_owned()))
        .collect()
}
