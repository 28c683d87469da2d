//! Locating a TTML document inside an arbitrary JSON payload.

use serde_json::Value;

/// Opening of a `tt` root element carrying at least one attribute.
pub const ROOT_PREFIX: &str = "<tt ";

/// Nesting depth beyond which the scanner stops descending.
const MAX_DEPTH: usize = 128;

/// Extract the TTML document from a lyrics payload.
///
/// Checks `data[0].attributes.ttmlLocalizations` first, which is where the
/// document lives in the common case, and falls back to a full
/// [`find_document`] walk when that field is missing or empty.
pub fn extract_document(payload: &Value) -> Option<String> {
    let direct = payload
        .pointer("/data/0/attributes/ttmlLocalizations")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());

    direct.or_else(|| find_document(payload)).map(str::to_owned)
}

/// Depth-first search for the first string that opens with [`ROOT_PREFIX`].
///
/// Arrays are scanned in order and objects in key order; the first hit wins.
/// The returned string is the untrimmed original value.
pub fn find_document(value: &Value) -> Option<&str> {
    scan(value, 0)
}

fn scan(value: &Value, depth: usize) -> Option<&str> {
    if depth > MAX_DEPTH {
        return None;
    }

    match value {
        Value::String(s) => s.trim_start().starts_with(ROOT_PREFIX).then_some(s.as_str()),
        Value::Array(items) => items.iter().find_map(|item| scan(item, depth + 1)),
        Value::Object(map) => map.values().find_map(|item| scan(item, depth + 1)),
        Value::Null | Value::Bool(_) | Value::Number(_) => None,
    }
}
