//! Extraction configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use traj_align::AsofConfig;
use traj_types::TargetZone;

use crate::error::{BagError, Result};
use crate::typesys::{Stores, normalize_msgtype};

/// Topic the robot driver records transforms and gripper state on.
pub const DEFAULT_TOPIC: &str = "/imu_raw/Imu";

/// Transform message type.
pub const TRANSFORM_MSGTYPE: &str = "tf2_msgs/msg/TFMessage";

/// Gripper state message type.
pub const GRIPPER_MSGTYPE: &str = "ur5e_move/msg/gripper_pos";

/// Scalar field holding the gripper reading.
pub const GRIPPER_FIELD: &str = "gripper_pos";

/// End-effector frame.
pub const CHILD_FRAME: &str = "tool0_controller";

/// Robot base frame.
pub const PARENT_FRAME: &str = "base";

/// Raw gripper readings are divided by this before alignment.
pub const GRIPPER_DIVISOR: f64 = 100.0;

/// Settings for end-effector trajectory extraction.
///
/// Defaults reproduce the UR5e recording setup.
///
/// # Example
///
/// ```
/// use traj_bag::ExtractConfig;
///
/// let config = ExtractConfig::default();
/// assert_eq!(config.topic, "/imu_raw/Imu");
/// assert_eq!(config.child_frame, "tool0_controller");
/// assert!(config.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExtractConfig {
    /// Only connections on this topic are read.
    pub topic: String,

    /// Message type carrying end-effector transforms.
    pub transform_type: String,

    /// Message type carrying gripper readings.
    pub gripper_type: String,

    /// Numeric field of the gripper message.
    pub gripper_field: String,

    /// Required child frame of the first transform.
    pub child_frame: String,

    /// Required parent frame of the first transform.
    pub parent_frame: String,

    /// Divisor applied to raw gripper readings.
    pub gripper_divisor: f64,

    /// Zone output timestamps are rendered in.
    pub zone: TargetZone,

    /// Fallback schemas for types the bag does not define.
    pub store: Stores,

    /// Join options.
    pub asof: AsofConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            transform_type: TRANSFORM_MSGTYPE.to_string(),
            gripper_type: GRIPPER_MSGTYPE.to_string(),
            gripper_field: GRIPPER_FIELD.to_string(),
            child_frame: CHILD_FRAME.to_string(),
            parent_frame: PARENT_FRAME.to_string(),
            gripper_divisor: GRIPPER_DIVISOR,
            zone: TargetZone::est(),
            store: Stores::Ros1Noetic,
            asof: AsofConfig::default(),
        }
    }
}

impl ExtractConfig {
    /// Sets the topic filter.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Sets the child and parent frames.
    #[must_use]
    pub fn with_frames(mut self, child: impl Into<String>, parent: impl Into<String>) -> Self {
        self.child_frame = child.into();
        self.parent_frame = parent.into();
        self
    }

    /// Sets the gripper divisor.
    #[must_use]
    pub const fn with_gripper_divisor(mut self, divisor: f64) -> Self {
        self.gripper_divisor = divisor;
        self
    }

    /// Sets the output zone.
    #[must_use]
    pub fn with_zone(mut self, zone: TargetZone) -> Self {
        self.zone = zone;
        self
    }

    /// Sets the fallback store.
    #[must_use]
    pub const fn with_store(mut self, store: Stores) -> Self {
        self.store = store;
        self
    }

    /// Sets the join options.
    #[must_use]
    pub const fn with_asof(mut self, asof: AsofConfig) -> Self {
        self.asof = asof;
        self
    }

    /// Transform type in `pkg/msg/Type` form.
    #[must_use]
    pub fn transform_msgtype(&self) -> String {
        normalize_msgtype(&self.transform_type)
    }

    /// Gripper type in `pkg/msg/Type` form.
    #[must_use]
    pub fn gripper_msgtype(&self) -> String {
        normalize_msgtype(&self.gripper_type)
    }

    /// Returns `true` if all values are usable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks that all values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("topic", &self.topic),
            ("transform_type", &self.transform_type),
            ("gripper_type", &self.gripper_type),
            ("gripper_field", &self.gripper_field),
            ("child_frame", &self.child_frame),
            ("parent_frame", &self.parent_frame),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(BagError::invalid_config(format!("{name} must not be empty")));
        }
        if !self.gripper_divisor.is_finite() || self.gripper_divisor == 0.0 {
            return Err(BagError::invalid_config(format!(
                "gripper_divisor must be finite and non-zero, got {}",
                self.gripper_divisor
            )));
        }
        Ok(())
    }
}
