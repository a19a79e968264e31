//! Error types for label lookup.

use thiserror::Error;

/// Errors that can occur when reading a ground-truth label file.
#[derive(Debug, Error)]
pub enum LabelError {
    /// The file exists but could not be read.
    #[error("IO error reading {path}: {reason}")]
    Io {
        /// Label file path.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// The file is not valid JSON.
    #[error("invalid JSON in {path}: {reason}")]
    Parse {
        /// Label file path.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// The top-level JSON value is not an array.
    #[error("expected a JSON array of label entries in {path}, found {found}")]
    NotAnArray {
        /// Label file path.
        path: String,
        /// Kind of value found instead.
        found: &'static str,
    },
}

impl LabelError {
    /// Creates an IO error.
    #[must_use]
    pub fn io(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for label operations.
pub type Result<T> = std::result::Result<T, LabelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_file() {
        let err = LabelError::parse("labels.json", "expected value at line 1");
        assert!(err.to_string().contains("labels.json"));
        assert!(err.to_string().contains("line 1"));

        let err = LabelError::NotAnArray {
            path: "labels.json".into(),
            found: "object",
        };
        assert!(err.to_string().contains("found object"));
    }
}
