//! Line sources for the sensor hub.
//!
//! This module provides the line protocol parser, framing of raw byte
//! streams into lines, and the optional serial transport.

pub mod protocol;
pub mod reader;

#[cfg(feature = "serial")]
pub mod serial;

// Re-export commonly used types
pub use protocol::{parse_line, ParsedLine, DELIMITER, MAX_FIELD_LEN};
pub use reader::{next_line, LineSource, SourceError, MAX_LINE_BYTES, MAX_LINE_LEN};

#[cfg(feature = "serial")]
pub use serial::{available_ports, open_serial};
