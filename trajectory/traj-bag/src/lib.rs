//! ROS1 bag reading and end-effector trajectory extraction.
//!
//! This crate turns a robot recording into an aligned trajectory table:
//!
//! # Reading
//!
//! - [`BagReader`] - Memory-mapped ROS1 v2.0 bag, closed on drop
//! - [`MessageSource`] - Streams raw payloads with connection and record time
//! - [`MemorySource`] - In-memory source for building logs programmatically
//!
//! # Decoding
//!
//! - [`TypeStore`] - Message schemas from `.msg` text or the built-in ROS1
//!   Noetic set; decodes payloads into [`Value`] trees
//! - [`TfMessage`], [`TransformStamped`] - Typed views over decoded values
//!
//! # Extraction
//!
//! - [`extract_eef_trajectory`] - End-effector pose joined with gripper state
//! - [`ExtractConfig`] - Topic, types, frames, divisor and output zone
//!
//! # Example
//!
//! ```
//! use traj_bag::{Connection, ExtractConfig, MemorySource, MessageValue, TypeStore, Value};
//! use traj_bag::extract_from_source;
//! use traj_types::Timestamp;
//!
//! let mut source = MemorySource::new(TypeStore::ros1_noetic());
//! source.add_connection(
//!     Connection::new(0, "/imu_raw/Imu", "ur5e_move/gripper_pos")
//!         .with_definition("float64 gripper_pos\n"),
//! )?;
//! let reading: Value = MessageValue::new("ur5e_move/msg/gripper_pos")
//!     .with("gripper_pos", Value::Float(42.0))
//!     .into();
//! source.push_value(0, Timestamp::from_nanos(1), &reading)?;
//!
//! let (trajectory, stats) = extract_from_source(&source, &ExtractConfig::default())?;
//! assert!(trajectory.is_empty()); // no poses recorded
//! assert_eq!(stats.gripper_samples, 1);
//! # Ok::<(), traj_bag::BagError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod msg;
mod reader;
mod source;
mod typesys;
mod value;
mod wire;

// Re-export extraction
pub use extract::{
    ExtractStats, extract_eef_trajectory, extract_eef_trajectory_with, extract_from_source,
};

// Re-export configuration
pub use config::{
    CHILD_FRAME, DEFAULT_TOPIC, ExtractConfig, GRIPPER_DIVISOR, GRIPPER_FIELD, GRIPPER_MSGTYPE,
    PARENT_FRAME, TRANSFORM_MSGTYPE,
};

// Re-export sources
pub use reader::{BagReader, TopicInfo};
pub use source::{Connection, MemorySource, MessageSource, RawMessage, Visitor, overlay_definitions};

// Re-export schema types
pub use typesys::{
    FieldDef, FieldType, MessageDefinition, Primitive, Stores, TypeStore, get_typestore,
    normalize_msgtype, parse_message_definition,
};
pub use value::{MessageValue, RosDuration, RosTime, Value};

// Re-export typed views
pub use msg::{
    Header, Quaternion, TfMessage, Transform, TransformStamped, Vector3, nested_field,
    numeric_field,
};

// Re-export error types
pub use error::{BagError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BagError, BagReader, ExtractConfig, MessageSource, Stores, TypeStore, Value,
        extract_eef_trajectory, extract_eef_trajectory_with,
    };
}
