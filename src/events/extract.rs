//! Recursive key search over arbitrary nested JSON.
//!
//! Gerrit's stream event schema has shifted across server versions: the
//! uploader account has appeared under `patchSet.uploader`, under a
//! top-level `uploader`, and under `change.owner`. When the typed schema in
//! [`super::parser`] fails to locate a field, this module provides the
//! documented fallback: walk the whole event looking for the key, discard
//! empty-string matches, and take the first non-empty candidate in traversal
//! order.

use serde_json::Value;

/// Returns the first non-empty string stored under `key` anywhere in `value`.
///
/// Objects are visited in map order, arrays front to back. A matched key
/// whose value is not a string (or is the empty string) is skipped; the
/// search does not descend into a matched value.
pub fn first_non_empty<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k == key {
                    if let Value::String(s) = v {
                        if !s.is_empty() {
                            return Some(s);
                        }
                    }
                } else if let Some(found) = first_non_empty(v, key) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(|item| first_non_empty(item, key)),
        _ => None,
    }
}
