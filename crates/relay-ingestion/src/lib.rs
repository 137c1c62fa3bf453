//! Ingestion, persistence and relay orchestration.
//!
//! Responsible for turning an inbound webhook into a stored event, handing it
//! to the forwarder when a target is configured, and serving stored events
//! back out.

pub mod application;
pub mod domain;
