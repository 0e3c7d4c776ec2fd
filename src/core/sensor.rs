//! Sensors and their per-kind aggregation policies.
//!
//! A [`Sensor`] owns one [`ReadingHistory`] whose value type is fixed by its
//! [`SensorKind`]: temperature sensors store `f32` and drop their lowest
//! reading before averaging, pressure sensors store `i32` and average
//! everything.

use crate::core::history::{Reading, ReadingHistory};
use crate::error::SensorError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Maximum number of characters kept in a sensor id.
pub const MAX_ID_LEN: usize = 49;

/// Measurement category of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Temperature in degrees Celsius, floating point
    Temperature,
    /// Atmospheric pressure in hectopascal, integer
    Pressure,
}

impl SensorKind {
    /// Map a line protocol kind code to a kind.
    pub fn from_code(code: char) -> Result<Self, SensorError> {
        match code {
            'T' => Ok(Self::Temperature),
            'P' => Ok(Self::Pressure),
            other => Err(SensorError::UnknownKind(other)),
        }
    }

    /// Line protocol kind code.
    pub fn code(self) -> char {
        match self {
            Self::Temperature => 'T',
            Self::Pressure => 'P',
        }
    }

    /// Display unit for readings of this kind.
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Pressure => "hPa",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::Pressure => write!(f, "pressure"),
        }
    }
}

/// How value text that is not a clean number is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuePolicy {
    /// Take the leading numeric prefix, zero if there is none.
    #[default]
    Lenient,
    /// Reject the reading with [`SensorError::InvalidValue`].
    Strict,
}

/// Sensor identifier, at most [`MAX_ID_LEN`] characters.
///
/// Longer input is truncated on construction, so ids coming from the line
/// protocol and ids typed by an operator compare equal after the same cut.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SensorId(String);

impl SensorId {
    /// Create an id, truncating to [`MAX_ID_LEN`] characters.
    pub fn new(raw: &str) -> Self {
        Self(truncate_chars(raw, MAX_ID_LEN).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SensorId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Borrow<str> for SensorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SensorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Longest prefix of `s` holding at most `max` characters.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((cut, _)) => &s[..cut],
        None => s,
    }
}

/// A single parsed reading, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Temperature(f32),
    Pressure(i32),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Temperature(v) => write!(f, "{v} {}", SensorKind::Temperature.unit()),
            Value::Pressure(v) => write!(f, "{v} {}", SensorKind::Pressure.unit()),
        }
    }
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The history was empty.
    NoReadings,
    /// Temperature average after the lowest reading was filtered out.
    Temperature {
        average: f32,
        /// The reading removed by this pass, if there were at least two.
        dropped: Option<f32>,
        /// Readings left in the history after filtering.
        remaining: usize,
    },
    /// Plain pressure average.
    Pressure { average: i32, readings: usize },
}

/// Summary returned by [`Sensor::process`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSummary {
    pub id: SensorId,
    pub kind: SensorKind,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ProcessSummary {
    /// The reported average, if any readings were present.
    pub fn average(&self) -> Option<Value> {
        match self.outcome {
            Outcome::NoReadings => None,
            Outcome::Temperature { average, .. } => Some(Value::Temperature(average)),
            Outcome::Pressure { average, .. } => Some(Value::Pressure(average)),
        }
    }
}

impl fmt::Display for ProcessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): ", self.id, self.kind)?;
        match &self.outcome {
            Outcome::NoReadings => write!(f, "no readings available"),
            Outcome::Temperature {
                average,
                dropped: Some(dropped),
                ..
            } => write!(
                f,
                "average {average:.2} °C (lowest reading {dropped} °C dropped)"
            ),
            Outcome::Temperature {
                average,
                dropped: None,
                ..
            } => write!(f, "average {average:.2} °C"),
            Outcome::Pressure { average, readings } => {
                write!(f, "average {average} hPa over {readings} readings")
            }
        }
    }
}

/// Identity of a sensor without its readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorDescription {
    pub kind: SensorKind,
    pub id: SensorId,
}

impl fmt::Display for SensorDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.id)
    }
}

#[derive(Debug, Clone)]
enum History {
    Temperature(ReadingHistory<f32>),
    Pressure(ReadingHistory<i32>),
}

/// A sensor: an id plus the reading history of its kind.
#[derive(Debug, Clone)]
pub struct Sensor {
    id: SensorId,
    history: History,
}

impl Sensor {
    /// Create a sensor with an empty history.
    pub fn new(kind: SensorKind, id: impl Into<SensorId>) -> Self {
        let history = match kind {
            SensorKind::Temperature => History::Temperature(ReadingHistory::new()),
            SensorKind::Pressure => History::Pressure(ReadingHistory::new()),
        };
        Self {
            id: id.into(),
            history,
        }
    }

    pub fn temperature(id: impl Into<SensorId>) -> Self {
        Self::new(SensorKind::Temperature, id)
    }

    pub fn pressure(id: impl Into<SensorId>) -> Self {
        Self::new(SensorKind::Pressure, id)
    }

    pub fn id(&self) -> &SensorId {
        &self.id
    }

    pub fn kind(&self) -> SensorKind {
        match self.history {
            History::Temperature(_) => SensorKind::Temperature,
            History::Pressure(_) => SensorKind::Pressure,
        }
    }

    /// Number of readings currently held.
    pub fn reading_count(&self) -> usize {
        match &self.history {
            History::Temperature(h) => h.count(),
            History::Pressure(h) => h.count(),
        }
    }

    /// Temperature history, if this is a temperature sensor.
    pub fn temperature_history(&self) -> Option<&ReadingHistory<f32>> {
        match &self.history {
            History::Temperature(h) => Some(h),
            History::Pressure(_) => None,
        }
    }

    /// Pressure history, if this is a pressure sensor.
    pub fn pressure_history(&self) -> Option<&ReadingHistory<i32>> {
        match &self.history {
            History::Pressure(h) => Some(h),
            History::Temperature(_) => None,
        }
    }

    /// Parse `raw` leniently and append it. Text that is not a number
    /// becomes zero.
    pub fn ingest_from_text(&mut self, raw: &str) -> Value {
        match &mut self.history {
            History::Temperature(h) => {
                let v = f32::parse_lenient(raw);
                h.append(v);
                self.log_ingested(Value::Temperature(v))
            }
            History::Pressure(h) => {
                let v = i32::parse_lenient(raw);
                h.append(v);
                self.log_ingested(Value::Pressure(v))
            }
        }
    }

    /// Parse `raw` under `policy` and append it.
    ///
    /// With [`ValuePolicy::Strict`] unparsable text is rejected and the
    /// history is left unchanged.
    pub fn ingest_text(&mut self, raw: &str, policy: ValuePolicy) -> Result<Value, SensorError> {
        if policy == ValuePolicy::Lenient {
            return Ok(self.ingest_from_text(raw));
        }

        let kind = self.kind();
        let value = match &mut self.history {
            History::Temperature(h) => {
                let v = f32::parse_strict(raw)
                    .ok_or_else(|| SensorError::invalid_value(kind, raw))?;
                h.append(v);
                Value::Temperature(v)
            }
            History::Pressure(h) => {
                let v = i32::parse_strict(raw)
                    .ok_or_else(|| SensorError::invalid_value(kind, raw))?;
                h.append(v);
                Value::Pressure(v)
            }
        };
        Ok(self.log_ingested(value))
    }

    fn log_ingested(&self, value: Value) -> Value {
        tracing::info!(sensor = %self.id, kind = %self.kind(), value = %value, "ingested reading");
        value
    }

    /// Run this sensor's aggregation policy over its history.
    ///
    /// Temperature sensors permanently remove their lowest reading on every
    /// call before averaging; pressure sensors only read.
    pub fn process(&mut self) -> ProcessSummary {
        let kind = self.kind();
        let outcome = match &mut self.history {
            History::Temperature(h) if h.is_empty() => Outcome::NoReadings,
            History::Pressure(h) if h.is_empty() => Outcome::NoReadings,
            History::Temperature(h) => {
                let dropped = h.drop_lowest();
                Outcome::Temperature {
                    average: h.average(),
                    dropped,
                    remaining: h.count(),
                }
            }
            History::Pressure(h) => Outcome::Pressure {
                average: h.average(),
                readings: h.count(),
            },
        };

        tracing::debug!(sensor = %self.id, kind = %kind, ?outcome, "processed sensor");

        ProcessSummary {
            id: self.id.clone(),
            kind,
            outcome,
        }
    }

    /// Kind and id, without touching the history.
    pub fn describe(&self) -> SensorDescription {
        SensorDescription {
            kind: self.kind(),
            id: self.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(SensorKind::from_code('T'), Ok(SensorKind::Temperature));
        assert_eq!(SensorKind::from_code('P'), Ok(SensorKind::Pressure));
        assert_eq!(SensorKind::from_code('t'), Err(SensorError::UnknownKind('t')));
        assert_eq!(SensorKind::Pressure.code(), 'P');
    }

    #[test]
    fn test_sensor_id_truncation() {
        let long = "x".repeat(80);
        let id = SensorId::new(&long);
        assert_eq!(id.as_str().len(), MAX_ID_LEN);

        let id = SensorId::new("T-001");
        assert_eq!(id.as_str(), "T-001");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("ñandú", 3), "ñan");
        assert_eq!(truncate_chars("ab", 5), "ab");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_temperature_process_drops_lowest() {
        let mut sensor = Sensor::temperature("T-001");
        for raw in ["10.0", "20.0", "30.0"] {
            sensor.ingest_from_text(raw);
        }

        let summary = sensor.process();
        assert_eq!(
            summary.outcome,
            Outcome::Temperature {
                average: 25.0,
                dropped: Some(10.0),
                remaining: 2,
            }
        );
        assert_eq!(sensor.reading_count(), 2);
    }

    #[test]
    fn test_temperature_filter_is_destructive_per_call() {
        let mut sensor = Sensor::temperature("T-002");
        for raw in ["10", "20", "30"] {
            sensor.ingest_from_text(raw);
        }

        sensor.process();
        let second = sensor.process();
        assert_eq!(second.average(), Some(Value::Temperature(30.0)));

        // A single reading is never dropped.
        let third = sensor.process();
        assert_eq!(third.average(), Some(Value::Temperature(30.0)));
        assert_eq!(sensor.reading_count(), 1);
    }

    #[test]
    fn test_pressure_process_plain_average() {
        let mut sensor = Sensor::pressure("P-105");
        for raw in ["1000", "1010", "990"] {
            sensor.ingest_from_text(raw);
        }

        let summary = sensor.process();
        assert_eq!(summary.average(), Some(Value::Pressure(1000)));
        assert_eq!(sensor.reading_count(), 3);
    }

    #[test]
    fn test_empty_sensor_reports_no_readings() {
        let mut sensor = Sensor::pressure("P-001");
        let summary = sensor.process();
        assert_eq!(summary.outcome, Outcome::NoReadings);
        assert_eq!(summary.average(), None);
        assert!(summary.to_string().contains("no readings"));
    }

    #[test]
    fn test_lenient_ingest_turns_garbage_into_zero() {
        let mut sensor = Sensor::temperature("T-003");
        assert_eq!(sensor.ingest_from_text("garbage"), Value::Temperature(0.0));
        assert_eq!(sensor.temperature_history().unwrap().values(), &[0.0]);
    }

    #[test]
    fn test_strict_ingest_rejects_garbage() {
        let mut sensor = Sensor::pressure("P-002");
        let err = sensor.ingest_text("12abc", ValuePolicy::Strict).unwrap_err();
        assert_eq!(err, SensorError::invalid_value(SensorKind::Pressure, "12abc"));
        assert_eq!(sensor.reading_count(), 0);

        assert_eq!(
            sensor.ingest_text("1012", ValuePolicy::Strict),
            Ok(Value::Pressure(1012))
        );
        assert_eq!(sensor.pressure_history().unwrap().values(), &[1012]);
    }

    #[test]
    fn test_describe() {
        let sensor = Sensor::temperature("T-009");
        let description = sensor.describe();
        assert_eq!(description.kind, SensorKind::Temperature);
        assert_eq!(description.id.as_str(), "T-009");
        assert_eq!(description.to_string(), "[temperature] T-009");
    }

    #[test]
    fn test_summary_json() {
        let mut sensor = Sensor::pressure("P-7");
        sensor.ingest_from_text("1000");
        let json = serde_json::to_value(sensor.process()).unwrap();
        assert_eq!(json["id"], "P-7");
        assert_eq!(json["kind"], "pressure");
        assert_eq!(json["outcome"], "pressure");
        assert_eq!(json["average"], 1000);
    }
}
