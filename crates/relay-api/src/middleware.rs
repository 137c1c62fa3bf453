//! Request correlation and per-request accounting.
//!
//! Every request gets a correlation id (the inbound `X-Request-ID` or a fresh
//! one), runs inside a span tagged with it, is counted and timed, and has the
//! id echoed back on the response.

use std::convert::Infallible;
use std::time::Instant;

use axum::extract::{FromRequestParts, MatchedPath, Request, State};
use axum::http::HeaderValue;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use relay_core::correlation::{CorrelationId, REQUEST_ID_HEADER};
use tracing::{Instrument, info, info_span};

use crate::state::AppState;

/// Metrics label for requests that matched no route, so arbitrary URLs do
/// not each open a new series.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Extractor for the correlation id of the current request.
#[derive(Debug, Clone)]
pub struct RequestId(pub CorrelationId);

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<CorrelationId>() {
            return Ok(Self(id.clone()));
        }
        Ok(Self(resolve(parts.headers.get(REQUEST_ID_HEADER))))
    }
}

fn resolve(header: Option<&HeaderValue>) -> CorrelationId {
    CorrelationId::resolve(header.and_then(|value| value.to_str().ok()))
}

/// Resolves the correlation id, records metrics, and logs the outcome of
/// every request.
pub async fn track_requests(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let correlation_id = resolve(request.headers().get(REQUEST_ID_HEADER));
    request.extensions_mut().insert(correlation_id.clone());

    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ROUTE, MatchedPath::as_str)
        .to_owned();
    let path = request.uri().path().to_owned();

    let span = info_span!(
        "request",
        request_id = %correlation_id,
        method = %method,
        path = %path,
        route = %route,
    );

    let started = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    let elapsed = started.elapsed();

    let status = response.status().as_u16();
    state
        .metrics
        .observe(method.as_str(), &route, status, elapsed);
    span.in_scope(|| {
        info!(
            status,
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "request completed"
        );
    });

    if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
