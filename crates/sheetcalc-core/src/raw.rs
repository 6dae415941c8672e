//! Read-only access into the raw character document.
//!
//! Two schema generations are in circulation: the current layout nests
//! everything under a `character` object, the legacy layout is flat. Each
//! coordinator resolves its inputs through [`first`] and friends, listing the
//! current path before the legacy one. The pipeline engine itself never
//! interprets the document.

use serde_json::Value;

/// Resolve a dotted path (`"character.abilities.strength.score"`) through
/// nested objects. Returns `None` on any missing segment or non-object hop.
pub fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = raw;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Return the value at the first path that resolves.
pub fn first<'a>(raw: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths.iter().find_map(|path| lookup(raw, path))
}

/// First path that resolves to a string.
pub fn first_str<'a>(raw: &'a Value, paths: &[&str]) -> Option<&'a str> {
    paths.iter().find_map(|path| lookup(raw, path)?.as_str())
}

/// First path that resolves to an integer.
///
/// Accepts JSON numbers and numeric strings (the legacy scraper emitted
/// scores as strings).
pub fn first_i64(raw: &Value, paths: &[&str]) -> Option<i64> {
    paths.iter().find_map(|path| {
        let value = lookup(raw, path)?;
        value
            .as_i64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
    })
}

/// First path that resolves to an unsigned integer.
pub fn first_u64(raw: &Value, paths: &[&str]) -> Option<u64> {
    first_i64(raw, paths).and_then(|n| u64::try_from(n).ok())
}

/// First path that resolves to a boolean.
pub fn first_bool(raw: &Value, paths: &[&str]) -> Option<bool> {
    paths.iter().find_map(|path| lookup(raw, path)?.as_bool())
}

/// First path that resolves to an array.
pub fn first_array<'a>(raw: &'a Value, paths: &[&str]) -> Option<&'a Vec<Value>> {
    paths.iter().find_map(|path| lookup(raw, path)?.as_array())
}

/// First path that resolves to an object.
pub fn first_object<'a>(
    raw: &'a Value,
    paths: &[&str],
) -> Option<&'a serde_json::Map<String, Value>> {
    paths.iter().find_map(|path| lookup(raw, path)?.as_object())
}
