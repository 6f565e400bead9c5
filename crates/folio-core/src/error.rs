//! Error types for the folio controllers.
//!
//! Runtime paths have no errors; these only cover configuration and
//! explicit offset parsing.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config directory found.
    #[error("Config directory not found")]
    NoConfigDir,

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value parsed but is out of range.
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors from parsing a trigger offset such as `"top 80%"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OffsetParseError {
    /// Offset string did not contain exactly two parts.
    #[error("Expected '<element edge> <viewport position>', got '{0}'")]
    Shape(String),

    /// Unknown keyword or malformed percentage.
    #[error("Invalid position '{0}'")]
    Position(String),

    /// Relative end offset like `+=500` did not carry a number.
    #[error("Invalid relative offset '{0}'")]
    Relative(String),
}
