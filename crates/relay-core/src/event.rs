//! The received-event entity.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::correlation::{CorrelationId, REQUEST_ID_HEADER};
use crate::error::DomainError;

/// A webhook body. Only JSON objects are accepted.
pub type Payload = serde_json::Map<String, Value>;

/// Allow-listed inbound headers, keyed by lowercase header name.
pub type CapturedHeaders = BTreeMap<String, String>;

/// Inbound headers that are recorded with an event. Everything else is dropped.
pub const ALLOWED_HEADERS: [&str; 3] = ["user-agent", "content-type", REQUEST_ID_HEADER];

/// A durably recorded inbound webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Identifier generated at ingestion.
    #[serde(rename = "event_id")]
    pub id: Uuid,
    /// Caller-supplied name of the upstream producer.
    pub source: String,
    /// Ingestion time, captured by the coordinator.
    pub received_at: DateTime<Utc>,
    /// The webhook body.
    pub payload: Payload,
    /// Allow-listed inbound headers plus the resolved correlation id.
    pub headers: CapturedHeaders,
    /// Correlation id of the request that delivered this event.
    pub request_id: String,
}

/// The subset of an event sent to the downstream target.
#[derive(Debug, Clone, Serialize)]
pub struct RelayEventView<'a> {
    /// Event identifier.
    pub event_id: Uuid,
    /// Upstream producer name.
    pub source: &'a str,
    /// Ingestion time.
    pub received_at: DateTime<Utc>,
    /// The webhook body.
    pub payload: &'a Payload,
    /// Captured headers.
    pub headers: &'a CapturedHeaders,
}

impl<'a> From<&'a Event> for RelayEventView<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            event_id: event.id,
            source: &event.source,
            received_at: event.received_at,
            payload: &event.payload,
            headers: &event.headers,
        }
    }
}

/// Keeps only allow-listed, non-empty headers from an inbound header set.
///
/// Names are matched case-insensitively and stored lowercase.
pub fn capture_headers<'a, I>(headers: I) -> CapturedHeaders
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    headers
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .filter_map(|(name, value)| {
            let name = name.to_ascii_lowercase();
            ALLOWED_HEADERS
                .contains(&name.as_str())
                .then(|| (name, value.to_owned()))
        })
        .collect()
}

/// Returns `captured` with the correlation id recorded under its reserved key.
///
/// The resolved id wins over whatever value the caller sent.
#[must_use]
pub fn with_correlation(
    mut captured: CapturedHeaders,
    correlation_id: &CorrelationId,
) -> CapturedHeaders {
    captured.insert(REQUEST_ID_HEADER.to_owned(), correlation_id.as_str().to_owned());
    captured
}

/// Parses a raw request body, accepting only a JSON object.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the body is not valid JSON or is any
/// JSON value other than an object.
pub fn parse_payload(body: &[u8]) -> Result<Payload, DomainError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| DomainError::Validation(format!("body is not valid JSON: {e}")))?;
    match value {
        Value::Object(payload) => Ok(payload),
        other => Err(DomainError::Validation(format!(
            "payload must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
