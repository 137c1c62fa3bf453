//! Commands for the ingestion pipeline.

use relay_core::correlation::CorrelationId;
use relay_core::event::{CapturedHeaders, Payload};

/// Command to record one inbound webhook and relay it if configured.
#[derive(Debug, Clone)]
pub struct IngestWebhook {
    /// The correlation ID for tracing.
    pub correlation_id: CorrelationId,
    /// Name of the upstream producer, taken from the route.
    pub source: String,
    /// The already-validated webhook body.
    pub payload: Payload,
    /// Allow-listed inbound headers.
    pub headers: CapturedHeaders,
}
