//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use relay_api::metrics::HttpMetrics;
use relay_api::state::AppState;
use relay_core::clock::SystemClock;
use relay_event_store::sqlite_event_store::SqliteEventStore;
use relay_forwarder::{HttpRelayForwarder, RetrySchedule};
use tower::ServiceExt;

/// A retry schedule with short pauses so exhausted relays finish quickly.
pub fn fast_schedule() -> RetrySchedule {
    RetrySchedule::new(vec![Duration::from_millis(10); 3], Duration::from_secs(2))
}

/// Build the full app over a fresh in-memory `SQLite` store and a real HTTP
/// forwarder. Uses the same router as the binary.
pub async fn build_test_app(target_url: Option<&str>) -> Router {
    let store = SqliteEventStore::connect("sqlite::memory:").await.unwrap();
    let forwarder = HttpRelayForwarder::new(fast_schedule()).unwrap();
    let state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(store),
        Arc::new(forwarder),
        target_url.map(str::to_owned),
        Arc::new(HttpMetrics::new().unwrap()),
    );
    relay_api::app(state)
}

/// Send a request and return status, headers and the raw body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body.to_vec())
}

/// Send a POST request with a raw body and extra headers, returning the
/// parsed JSON response.
pub async fn post_raw(
    app: &Router,
    uri: &str,
    body: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, HeaderMap, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::from(body.to_owned())).unwrap();

    let (status, headers, bytes) = send(app, request).await;
    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let (status, _, json) = post_raw(app, uri, &body.to_string(), &[]).await;
    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let (status, _, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}
