//! Integration tests for `PgEventStore`.
//!
//! These need a reachable PostgreSQL server named by `DATABASE_URL`; run them
//! with `cargo test -- --ignored`.

use chrono::{DateTime, Duration, SubsecRound, TimeZone, Utc};
use relay_core::error::DomainError;
use relay_core::event::{CapturedHeaders, Event};
use relay_core::store::{EventLimit, EventStore};
use relay_event_store::pg_event_store::PgEventStore;
use sqlx::PgPool;
use uuid::Uuid;

/// Helper to build an `Event` with sensible defaults.
fn make_event(received_at: DateTime<Utc>) -> Event {
    let mut headers = CapturedHeaders::new();
    headers.insert("content-type".to_owned(), "application/json".to_owned());
    headers.insert("x-request-id".to_owned(), "req-pg".to_owned());
    Event {
        id: Uuid::new_v4(),
        source: "stripe".to_owned(),
        received_at,
        payload: serde_json::json!({"type": "charge.succeeded", "amount": 1200})
            .as_object()
            .unwrap()
            .clone(),
        headers,
        request_id: "req-pg".to_owned(),
    }
}

#[sqlx::test(migrations = "../../migrations/postgres")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_get_returns_none_for_unknown_id(pool: PgPool) {
    let store = PgEventStore::new(pool);

    assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations/postgres")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_append_and_get_round_trip(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let event = make_event(Utc::now().trunc_subsecs(6));

    store.append(&event).await.unwrap();

    let loaded = store.get(event.id).await.unwrap().unwrap();
    assert_eq!(loaded, event);
}

#[sqlx::test(migrations = "../../migrations/postgres")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_append_rejects_duplicate_id(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let event = make_event(Utc::now().trunc_subsecs(6));
    store.append(&event).await.unwrap();

    let result = store.append(&event).await;

    assert!(matches!(result, Err(DomainError::Persistence(_))));
}

#[sqlx::test(migrations = "../../migrations/postgres")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_list_recent_returns_newest_first_and_respects_limit(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let base = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
    let mut appended = Vec::new();
    for offset in 0..4 {
        let event = make_event(base + Duration::seconds(offset));
        store.append(&event).await.unwrap();
        appended.push(event.id);
    }

    let listed = store.list_recent(EventLimit::clamped(Some(2))).await.unwrap();

    let ids: Vec<Uuid> = listed.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![appended[3], appended[2]]);
}

#[sqlx::test(migrations = "../../migrations/postgres")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_ping_succeeds(pool: PgPool) {
    let store = PgEventStore::new(pool);

    store.ping().await.unwrap();
}

#[sqlx::test(migrations = "../../migrations/postgres")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_append_keeps_long_request_id_verbatim(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let mut event = make_event(Utc::now().trunc_subsecs(6));
    event.request_id = "r".repeat(1024);

    store.append(&event).await.unwrap();

    let loaded = store.get(event.id).await.unwrap().unwrap();
    assert_eq!(loaded, event);
}

#[sqlx::test(migrations = "../../migrations/postgres")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_append_keeps_nul_escape_in_payload(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let mut event = make_event(Utc::now().trunc_subsecs(6));
    event.payload = serde_json::json!({"note": "a\u{0}b"})
        .as_object()
        .unwrap()
        .clone();

    store.append(&event).await.unwrap();

    let loaded = store.get(event.id).await.unwrap().unwrap();
    assert_eq!(loaded.payload["note"], "a\u{0}b");
}
