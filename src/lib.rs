//! Sensor Hub - sensor registry and reading-history engine.
//!
//! This library keeps a registry of heterogeneous sensors (temperature,
//! pressure), stores every reading they receive, and produces aggregate
//! readings on demand. Readings arrive as semicolon-delimited text lines,
//! typically from a microcontroller on a serial link.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Sensor Hub                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │ LineSource  │──▶│  Protocol   │──▶│  Ingestor   │        │
//! │  │ (thread)    │   │ K;ID;VALUE  │   │ find/create │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │                                             │               │
//! │                                             ▼               │
//! │  ┌─────────────┐                     ┌─────────────┐        │
//! │  │ IngestLog   │                     │  Registry   │        │
//! │  │ (counters)  │                     │ Sensor ──▶  │        │
//! │  └─────────────┘                     │  History<T> │        │
//! │                                      └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use sensor_hub::{SensorKind, SensorRegistry};
//!
//! let mut registry: SensorRegistry = SensorRegistry::new();
//! let sensor = registry.find_or_create(SensorKind::Temperature, "T-001").unwrap();
//! for raw in ["10.0", "20.0", "30.0"] {
//!     sensor.ingest_from_text(raw);
//! }
//!
//! // The lowest temperature is dropped before averaging.
//! let summaries = registry.process_all();
//! assert_eq!(
//!     summaries[0].to_string(),
//!     "T-001 (temperature): average 25.00 °C (lowest reading 10 °C dropped)"
//! );
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod ingest;
pub mod source;
pub mod stats;

// Re-export key types at crate root for convenience
pub use config::{Config, SerialConfig};
pub use core::{
    Outcome, ProcessSummary, Reading, ReadingHistory, Sensor, SensorDescription, SensorId,
    SensorKind, SensorRegistry, Value, ValuePolicy,
};
pub use error::{ConfigError, SensorError};
pub use ingest::{Ingestor, LineOutcome};
pub use source::{parse_line, LineSource, ParsedLine};
pub use stats::{IngestLog, IngestStats, SharedIngestLog};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
