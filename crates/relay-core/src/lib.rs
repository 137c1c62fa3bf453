//! Shared domain types and collaborator traits for the webhook relay.
//!
//! This crate defines the event entity, the correlation identity threaded
//! through a request, and the narrow interfaces to storage and forwarding.
//! It contains no infrastructure code.

pub mod clock;
pub mod correlation;
pub mod error;
pub mod event;
pub mod relay;
pub mod store;
