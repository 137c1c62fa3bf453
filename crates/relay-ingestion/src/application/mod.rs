//! Application services: the ingestion coordinator and event queries.

pub mod coordinator;
pub mod query_handlers;
