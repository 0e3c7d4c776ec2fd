//! Core functionality for the sensor hub.
//!
//! This module contains:
//! - The generic reading history with average and drop-lowest operations
//! - Sensors with per-kind aggregation policies
//! - The registry that owns every sensor

pub mod history;
pub mod registry;
pub mod sensor;

// Re-export commonly used types
pub use history::{Reading, ReadingHistory};
pub use registry::{Registered, SensorRegistry};
pub use sensor::{
    Outcome, ProcessSummary, Sensor, SensorDescription, SensorId, SensorKind, Value, ValuePolicy,
    MAX_ID_LEN,
};
