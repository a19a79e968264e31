//! Error types for trajectory data.

use thiserror::Error;

/// Errors that can occur when building or exporting trajectory data.
#[derive(Debug, Error)]
pub enum TypesError {
    /// Timestamp cannot be represented as a calendar date.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Time zone name or offset was not recognized.
    #[error("invalid time zone: {0}")]
    InvalidZone(String),

    /// CSV export failed.
    #[error("CSV error: {0}")]
    Csv(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),
}

impl TypesError {
    /// Creates an invalid timestamp error.
    #[must_use]
    pub fn invalid_timestamp(reason: impl Into<String>) -> Self {
        Self::InvalidTimestamp(reason.into())
    }

    /// Creates an invalid zone error.
    #[must_use]
    pub fn invalid_zone(zone: impl Into<String>) -> Self {
        Self::InvalidZone(zone.into())
    }
}

impl From<std::io::Error> for TypesError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<csv::Error> for TypesError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type for trajectory data operations.
pub type Result<T> = std::result::Result<T, TypesError>;
