//! Results returned to the caller of an ingestion.

use chrono::{DateTime, Utc};
use relay_core::relay::RelayOutcome;
use serde::Serialize;
use uuid::Uuid;

/// What the caller learns about an ingested webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReceipt {
    /// Identifier of the stored event.
    pub event_id: Uuid,
    /// When the event was received.
    pub received_at: DateTime<Utc>,
    /// Forwarding outcome; absent when no target is configured.
    #[serde(rename = "relay", skip_serializing_if = "Option::is_none")]
    pub relay_outcome: Option<RelayOutcome>,
}
