//! Ingestion counters.
//!
//! Counters are atomics, so recording only needs `&self` and a
//! [`SharedIngestLog`] can be read from another thread while the ingestor
//! records into it. Nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Ingestion statistics for the current session.
#[derive(Debug)]
pub struct IngestLog {
    /// Number of lines received from the source
    lines_received: AtomicU64,
    /// Number of readings appended to a sensor history
    readings_ingested: AtomicU64,
    /// Number of lines with no fields or an unknown kind code
    invalid_lines: AtomicU64,
    /// Number of well-formed lines the registry or value parser refused
    rejected_lines: AtomicU64,
    /// Number of sensors created on first sight
    sensors_created: AtomicU64,
    /// Number of processing passes over the registry
    processing_runs: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
}

impl IngestLog {
    /// Create a new ingestion log.
    pub fn new() -> Self {
        Self {
            lines_received: AtomicU64::new(0),
            readings_ingested: AtomicU64::new(0),
            invalid_lines: AtomicU64::new(0),
            rejected_lines: AtomicU64::new(0),
            sensors_created: AtomicU64::new(0),
            processing_runs: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    /// Record a received line.
    pub fn record_line(&self) {
        self.lines_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an ingested reading.
    pub fn record_reading(&self) {
        self.readings_ingested.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a malformed line.
    pub fn record_invalid_line(&self) {
        self.invalid_lines.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a line refused by the registry or the value parser.
    pub fn record_rejected_line(&self) {
        self.rejected_lines.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an auto-created sensor.
    pub fn record_sensor_created(&self) {
        self.sensors_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a processing pass.
    pub fn record_processing_run(&self) {
        self.processing_runs.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> IngestStats {
        IngestStats {
            lines_received: self.lines_received.load(Ordering::Relaxed),
            readings_ingested: self.readings_ingested.load(Ordering::Relaxed),
            invalid_lines: self.invalid_lines.load(Ordering::Relaxed),
            rejected_lines: self.rejected_lines.load(Ordering::Relaxed),
            sensors_created: self.sensors_created.load(Ordering::Relaxed),
            processing_runs: self.processing_runs.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Lines received: {}\n\
             - Readings ingested: {}\n\
             - Invalid lines: {}\n\
             - Rejected lines: {}\n\
             - Sensors created: {}\n\
             - Processing runs: {}\n\
             - Session duration: {} seconds",
            stats.lines_received,
            stats.readings_ingested,
            stats.invalid_lines,
            stats.rejected_lines,
            stats.sensors_created,
            stats.processing_runs,
            stats.session_duration_secs
        )
    }
}

impl Default for IngestLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of ingestion statistics.
#[derive(Debug, Clone, Serialize)]
pub struct IngestStats {
    pub lines_received: u64,
    pub readings_ingested: u64,
    pub invalid_lines: u64,
    pub rejected_lines: u64,
    pub sensors_created: u64,
    pub processing_runs: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Thread-safe shared ingestion log.
pub type SharedIngestLog = Arc<IngestLog>;

/// Create a new shared ingestion log.
pub fn create_shared_log() -> SharedIngestLog {
    Arc::new(IngestLog::new())
}
