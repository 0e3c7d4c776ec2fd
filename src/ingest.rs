//! Glue between a line source and the sensor registry.
//!
//! For every line the [`Ingestor`] parses the protocol fields, resolves the
//! kind code, finds or creates the sensor and feeds it the raw value. It
//! also decides when a periodic processing pass is due.

use crate::config::Config;
use crate::core::{ProcessSummary, SensorId, SensorKind, SensorRegistry, Value, ValuePolicy};
use crate::error::SensorError;
use crate::source::parse_line;
use crate::stats::{create_shared_log, SharedIngestLog};
use serde::Serialize;

/// What happened to one successfully ingested line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineOutcome {
    pub id: SensorId,
    pub kind: SensorKind,
    pub value: Value,
    /// Whether the sensor was created by this line.
    pub created: bool,
}

/// Drives a [`SensorRegistry`] from protocol lines.
pub struct Ingestor {
    registry: SensorRegistry,
    log: SharedIngestLog,
    policy: ValuePolicy,
    /// Lines between processing passes, 0 for never
    process_every: u64,
    lines_since_process: u64,
}

impl Ingestor {
    /// Create an ingestor with an empty registry.
    pub fn new(policy: ValuePolicy, process_every: u64) -> Self {
        Self {
            registry: SensorRegistry::new(),
            log: create_shared_log(),
            policy,
            process_every,
            lines_since_process: 0,
        }
    }

    /// Create an ingestor from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.value_policy, config.process_every)
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SensorRegistry {
        &mut self.registry
    }

    pub fn log(&self) -> &SharedIngestLog {
        &self.log
    }

    /// Ingest one framed line.
    ///
    /// Errors are local to the line: the registry is unchanged apart from a
    /// sensor that may have been created before its value was refused.
    pub fn handle_line(&mut self, line: &str) -> Result<LineOutcome, SensorError> {
        self.log.record_line();
        self.lines_since_process += 1;

        let result = self.ingest(line);
        match &result {
            Ok(_) => self.log.record_reading(),
            Err(e) if e.is_malformed_line() => {
                tracing::warn!(line, error = %e, "ignoring malformed line");
                self.log.record_invalid_line();
            }
            Err(e) => {
                tracing::warn!(line, error = %e, "line rejected");
                self.log.record_rejected_line();
            }
        }
        result
    }

    fn ingest(&mut self, line: &str) -> Result<LineOutcome, SensorError> {
        let parsed = parse_line(line)?;
        let kind = SensorKind::from_code(parsed.kind)?;

        let created = !self.registry.contains(&parsed.id);
        let sensor = self.registry.find_or_create(kind, &parsed.id)?;
        if created {
            self.log.record_sensor_created();
        }

        let value = sensor.ingest_text(&parsed.value, self.policy)?;
        Ok(LineOutcome {
            id: sensor.id().clone(),
            kind,
            value,
            created,
        })
    }

    /// Run a processing pass if enough lines arrived since the last one.
    pub fn due_summaries(&mut self) -> Option<Vec<ProcessSummary>> {
        if self.process_every == 0 || self.lines_since_process < self.process_every {
            return None;
        }
        Some(self.process_all())
    }

    /// Process every sensor now and restart the cadence.
    pub fn process_all(&mut self) -> Vec<ProcessSummary> {
        self.lines_since_process = 0;
        self.log.record_processing_run();
        self.registry.process_all()
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
