//! Response normalization and attribute rendering.
//!
//! Malformed or non-object response bodies degrade to an empty mapping rather
//! than failing; export must not be blocked by a server returning HTML.

use serde_json::Value;

use crate::dispatch::RawResponse;
use crate::types::{AttributeMap, CallOutcome};

/// Separator between rendered `key: value` pairs.
pub const ATTRIBUTE_SEPARATOR: &str = " || ";

/// Response key that duplicates the status column and is never rendered.
pub const STATUS_CODE_KEY: &str = "status_code";

/// Turn a raw response into a [`CallOutcome`]. Never fails.
pub fn normalize(payload_item: Option<Value>, raw: &RawResponse) -> CallOutcome {
    CallOutcome {
        payload_item,
        status_code: raw.status,
        response_body: parse_object(&raw.body),
    }
}

/// Parse `body` as a JSON object, or return an empty mapping.
pub fn parse_object(body: &str) -> AttributeMap {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => AttributeMap::new(),
    }
}

/// Render a JSON value for a `key: value` pair. Strings are unquoted.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Join `key: value` pairs in key order, skipping keys `skip` rejects.
pub fn join_attributes<'a>(
    attributes: impl IntoIterator<Item = (&'a String, &'a Value)>,
    skip: impl Fn(&str) -> bool,
) -> String {
    attributes
        .into_iter()
        .filter(|(key, _)| !skip(key.as_str()))
        .map(|(key, value)| format!("{key}: {}", render_value(value)))
        .collect::<Vec<_>>()
        .join(ATTRIBUTE_SEPARATOR)
}

/// Request-side rendering. Non-object payloads contribute nothing.
pub fn request_parameters(payload_item: Option<&Value>) -> String {
    match payload_item.and_then(Value::as_object) {
        Some(map) => join_attributes(map, str::is_empty),
        None => String::new(),
    }
}

/// Response-side rendering, without the status-code key.
pub fn response_parameters(response_body: &AttributeMap) -> String {
    join_attributes(response_body, |key| key == STATUS_CODE_KEY)
}
