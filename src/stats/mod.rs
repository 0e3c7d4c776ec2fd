//! Ingestion statistics for the sensor hub.
//!
//! This module tracks what the hub has received and what it did with it,
//! so an operator can see how many lines were dropped and why.

pub mod log;

// Re-export commonly used types
pub use log::{create_shared_log, IngestLog, IngestStats, SharedIngestLog};
