//! Webhook ingestion endpoint.

use std::borrow::Cow;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::{Json, Router, routing::post};
use relay_core::event::{capture_headers, parse_payload};
use relay_ingestion::domain::commands::IngestWebhook;
use relay_ingestion::domain::receipts::IngestionReceipt;
use tracing::instrument;

use crate::error::ApiError;
use crate::middleware::RequestId;
use crate::state::AppState;

/// POST /webhooks/{source}
///
/// The body is read raw so that anything other than a JSON object is
/// rejected with the same validation error shape.
#[instrument(skip_all, fields(source = %source))]
async fn receive_webhook(
    State(state): State<AppState>,
    Path(source): Path<String>,
    RequestId(correlation_id): RequestId,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IngestionReceipt>, ApiError> {
    let payload = parse_payload(&body)?;
    // Non-ASCII header bytes are kept, decoded lossily as UTF-8.
    let decoded: Vec<(&str, Cow<'_, str>)> = headers
        .iter()
        .map(|(name, value)| (name.as_str(), String::from_utf8_lossy(value.as_bytes())))
        .collect();
    let headers = capture_headers(decoded.iter().map(|(name, value)| (*name, value.as_ref())));

    let command = IngestWebhook {
        correlation_id,
        source,
        payload,
        headers,
    };

    let receipt = state.coordinator.handle_incoming(command).await?;
    Ok(Json(receipt))
}

/// Returns the webhook ingestion router.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/{source}", post(receive_webhook))
}
