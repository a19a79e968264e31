//! Error types for bag reading and trajectory extraction.

use thiserror::Error;
use traj_types::TypesError;

/// Errors that can occur while reading a bag or extracting a trajectory.
#[derive(Debug, Error)]
pub enum BagError {
    /// Failed to open or map the bag file.
    #[error("IO error: {0}")]
    Io(String),

    /// The container structure could not be read.
    #[error("bag container error: {0}")]
    Container(String),

    /// No schema is known for a message type.
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    /// A payload did not match its schema.
    #[error("failed to decode {msgtype}: {reason}")]
    Decode {
        /// Normalized message type.
        msgtype: String,
        /// Reason for failure.
        reason: String,
    },

    /// A value did not match the schema it was serialized against.
    #[error("failed to encode {msgtype}: {reason}")]
    Encode {
        /// Normalized message type.
        msgtype: String,
        /// Reason for failure.
        reason: String,
    },

    /// Message definition text could not be parsed.
    #[error("invalid message definition for {msgtype}: {reason}")]
    InvalidDefinition {
        /// Message type the definition belongs to.
        msgtype: String,
        /// Reason for failure.
        reason: String,
    },

    /// Extraction settings are unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Timestamp or table error.
    #[error(transparent)]
    Types(#[from] TypesError),
}

impl BagError {
    /// Creates a container error.
    #[must_use]
    pub fn container(reason: impl Into<String>) -> Self {
        Self::Container(reason.into())
    }

    /// Creates an unknown message type error.
    #[must_use]
    pub fn unknown_type(msgtype: impl Into<String>) -> Self {
        Self::UnknownMessageType(msgtype.into())
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(msgtype: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            msgtype: msgtype.into(),
            reason: reason.into(),
        }
    }

    /// Creates an encode error.
    #[must_use]
    pub fn encode(msgtype: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encode {
            msgtype: msgtype.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid definition error.
    #[must_use]
    pub fn invalid_definition(msgtype: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            msgtype: msgtype.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid config error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

impl From<std::io::Error> for BagError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<rosbag::Error> for BagError {
    fn from(err: rosbag::Error) -> Self {
        Self::Container(err.to_string())
    }
}

/// Result type for bag operations.
pub type Result<T> = std::result::Result<T, BagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_unknown_type() {
        let err = BagError::unknown_type("ur5e_move/msg/gripper_pos");
        assert!(err.to_string().contains("unknown message type"));
        assert!(err.to_string().contains("gripper_pos"));
    }

    #[test]
    fn error_decode() {
        let err = BagError::decode("tf2_msgs/msg/TFMessage", "unexpected end of payload");
        let msg = err.to_string();
        assert!(msg.contains("tf2_msgs/msg/TFMessage"));
        assert!(msg.contains("unexpected end"));
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such bag");
        let err: BagError = io_err.into();
        assert!(matches!(err, BagError::Io(_)));
    }

    #[test]
    fn error_from_types() {
        let err: BagError = TypesError::invalid_timestamp("too late").into();
        assert!(matches!(err, BagError::Types(_)));
        assert!(err.to_string().contains("too late"));
    }
}
