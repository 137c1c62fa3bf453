//! Commands and results for the ingestion pipeline.

pub mod commands;
pub mod receipts;
