//! Get-with-default readers over raw JSON payloads.
//!
//! The remote payload is trusted and never validated: an absent key, a
//! wrong-typed value, or a payload that is not an object at all each
//! read as `None`, so typed-view construction never fails.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Reads a string field.
pub(crate) fn get_str(data: &Value, key: &str) -> Option<String> {
    data.get(key)?.as_str().map(String::from)
}

/// Reads an integer field.
pub(crate) fn get_i64(data: &Value, key: &str) -> Option<i64> {
    data.get(key)?.as_i64()
}

/// Reads a boolean field.
pub(crate) fn get_bool(data: &Value, key: &str) -> Option<bool> {
    data.get(key)?.as_bool()
}

/// Reads an array field.
pub(crate) fn get_array<'a>(data: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    data.get(key)?.as_array()
}

/// Reads an RFC 3339 timestamp field.
pub(crate) fn get_datetime(data: &Value, key: &str) -> Option<DateTime<Utc>> {
    let text = data.get(key)?.as_str()?;
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|stamp| stamp.with_timezone(&Utc))
}
