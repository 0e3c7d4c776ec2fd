//! Error types for the sensor hub.
//!
//! Every condition here is local and recoverable: callers report it and carry
//! on with the next line. "Sensor not found" is not an error, lookups return
//! `Option` instead.

use crate::core::SensorKind;
use thiserror::Error;

/// Errors raised by the registry, the line protocol and value parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// The line holds no fields at all (empty, or only delimiters).
    #[error("invalid line: no fields in {0:?}")]
    InvalidLine(String),

    /// The kind code is neither `T` nor `P`.
    #[error("unknown sensor kind '{0}'")]
    UnknownKind(char),

    /// A sensor with this id is already registered.
    #[error("sensor '{0}' is already registered")]
    DuplicateId(String),

    /// The id is registered under a different kind.
    #[error("sensor '{id}' is a {existing} sensor, not {requested}")]
    KindMismatch {
        /// Sensor id.
        id: String,
        /// Kind the sensor was created with.
        existing: SensorKind,
        /// Kind the caller asked for.
        requested: SensorKind,
    },

    /// The value text is not a number (strict value policy only).
    #[error("invalid {kind} value {raw:?}")]
    InvalidValue {
        /// Kind of the receiving sensor.
        kind: SensorKind,
        /// Raw text as received.
        raw: String,
    },
}

impl SensorError {
    /// Creates a kind mismatch error.
    #[must_use]
    pub fn kind_mismatch(
        id: impl Into<String>,
        existing: SensorKind,
        requested: SensorKind,
    ) -> Self {
        Self::KindMismatch {
            id: id.into(),
            existing,
            requested,
        }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(kind: SensorKind, raw: impl Into<String>) -> Self {
        Self::InvalidValue {
            kind,
            raw: raw.into(),
        }
    }

    /// Whether the line itself was malformed, as opposed to being rejected
    /// by the registry or the value parser.
    pub fn is_malformed_line(&self) -> bool {
        matches!(self, Self::InvalidLine(_) | Self::UnknownKind(_))
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
