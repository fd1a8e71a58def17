//! Core data types for call descriptions, call outcomes, and exported rows.

use std::fmt;

use serde_json::{Map, Value};

/// Ordered key → JSON value mapping. Insertion order is the order keys
/// appeared in the source JSON text.
pub type AttributeMap = Map<String, Value>;

/// HTTP method of a job, parsed totally from the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    /// Parse a method cell. Matching is exact and case-sensitive.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
            Method::Other(raw) => f.write_str(raw),
        }
    }
}

/// One row of the input table: a single endpoint/method/payload combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub host: String,
    pub label: String,
    pub endpoint: String,
    /// Raw JSON-fragment text. `{"a":1},{"a":2}` describes two payload items.
    pub sample_payload: String,
    pub method: Method,
}

impl JobRecord {
    pub fn new(
        host: impl Into<String>,
        label: impl Into<String>,
        endpoint: impl Into<String>,
        sample_payload: impl Into<String>,
        method: &str,
    ) -> Self {
        Self {
            host: host.into(),
            label: label.into(),
            endpoint: endpoint.into(),
            sample_payload: sample_payload.into(),
            method: Method::parse(method),
        }
    }
}

/// Result of one issued call, paired with the payload item that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    /// `None` for the single GET call.
    pub payload_item: Option<Value>,
    pub status_code: u16,
    /// Empty when the response body was not a JSON object.
    pub response_body: AttributeMap,
}

/// The exported row shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub status_code: u16,
    pub request_parameters: String,
    pub response_parameters: String,
    pub endpoint: String,
}

impl NormalizedRecord {
    /// Column headers of an exported table, in order.
    pub const EXPORT_COLUMNS: [&'static str; 4] =
        ["StatusCode", "RequestParameters", "ResponseParameters", "EndPoint"];
}

/// Errors that abort a single job's dispatch.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("Payload parse error: {0}")]
    PayloadParse(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// Convenience result type.
pub type DispatchResult<T> = Result<T, DispatchError>;
