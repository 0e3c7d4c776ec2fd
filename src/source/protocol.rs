//! Semicolon-delimited line protocol.
//!
//! Each record is `<KIND>;<ID>;<VALUE>`, for example `T;T-001;25.6`. Parsing
//! is tolerant: empty fields between delimiters are skipped, missing trailing
//! fields default to empty strings and extra fields are ignored. Only a line
//! with no field at all is rejected.

use crate::core::sensor::truncate_chars;
use crate::error::SensorError;
use serde::Serialize;

/// Field delimiter.
pub const DELIMITER: char = ';';

/// Maximum number of characters kept in the id and value fields.
pub const MAX_FIELD_LEN: usize = 49;

/// The three fields of a protocol line, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedLine {
    /// First character of the first field.
    pub kind: char,
    /// Sensor id, possibly empty.
    pub id: String,
    /// Raw value text, possibly empty.
    pub value: String,
}

/// Split a line into kind code, id and raw value.
///
/// Trailing line terminators must already be stripped by the reader; no
/// whitespace is trimmed here.
pub fn parse_line(line: &str) -> Result<ParsedLine, SensorError> {
    let mut fields = line.split(DELIMITER).filter(|field| !field.is_empty());

    let kind = fields
        .next()
        .and_then(|field| field.chars().next())
        .ok_or_else(|| SensorError::InvalidLine(line.to_string()))?;

    let mut next_field = || {
        fields
            .next()
            .map(|field| truncate_chars(field, MAX_FIELD_LEN).to_string())
            .unwrap_or_default()
    };
    let id = next_field();
    let value = next_field();

    Ok(ParsedLine { kind, id, value })
}
