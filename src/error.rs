//! Crate-level error types.

use std::fmt;

/// Errors produced by the tactus crate.
///
/// Gesture interpretation itself never fails; these cover the I/O edges
/// (option presets and replay traces).
#[derive(Debug)]
pub enum TactusError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Malformed replay trace.
    TraceParse(String),
}

impl fmt::Display for TactusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::TraceParse(msg) => write!(f, "trace parse error: {msg}"),
        }
    }
}

impl std::error::Error for TactusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TactusError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
