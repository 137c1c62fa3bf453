//! Read endpoints for stored events.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get};
use relay_core::error::DomainError;
use relay_core::event::Event;
use relay_core::store::EventLimit;
use relay_ingestion::application::query_handlers::{
    EventListView, get_event_by_id, list_recent_events,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for GET /events.
#[derive(Debug, Deserialize)]
pub struct ListEventsParams {
    /// Requested page size; clamped into the accepted range.
    pub limit: Option<i64>,
}

/// GET /events
async fn list_events(
    State(state): State<AppState>,
    params: Result<Query<ListEventsParams>, QueryRejection>,
) -> Result<Json<EventListView>, ApiError> {
    let Query(params) =
        params.map_err(|e| DomainError::Validation(format!("invalid query: {e}")))?;
    let view = list_recent_events(EventLimit::clamped(params.limit), &*state.event_store).await?;
    Ok(Json(view))
}

/// GET /events/{event_id}
async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let event = get_event_by_id(&event_id, &*state.event_store).await?;
    Ok(Json(event))
}

/// Returns the router for event queries.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{event_id}", get(get_event))
}
