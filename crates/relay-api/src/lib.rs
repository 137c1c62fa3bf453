//! Webhook Relay HTTP API.
//!
//! Exposes the router, state and ambient setup (configuration, telemetry,
//! metrics) so the binary and the integration tests build the same app.

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    let routes = Router::new()
        .merge(routes::health::router())
        .merge(routes::webhooks::router())
        .merge(routes::events::router())
        .merge(routes::metrics::router());
    with_layers(routes, state)
}

/// Wraps `routes` in the request middleware stack and binds the state.
///
/// Panics are caught innermost so a crashed handler still gets a request id,
/// a metrics entry and a JSON 500.
fn with_layers(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::track_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
