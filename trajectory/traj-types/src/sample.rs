//! Pose, gripper and aligned trajectory samples.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::time::{Timed, Timestamp};

/// End-effector translation read from a transform message.
///
/// # Example
///
/// ```
/// use traj_types::{PoseSample, Timestamp};
///
/// let pose = PoseSample::new([0.1, 0.2, 0.3], Timestamp::from_nanos(10));
/// assert_eq!(pose.position(), [0.1, 0.2, 0.3]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseSample {
    /// X translation in meters.
    pub x: f64,
    /// Y translation in meters.
    pub y: f64,
    /// Z translation in meters.
    pub z: f64,
    /// Record time.
    pub timestamp: Timestamp,
}

impl PoseSample {
    /// Creates a pose sample from a translation.
    #[must_use]
    pub const fn new(translation: [f64; 3], timestamp: Timestamp) -> Self {
        Self {
            x: translation[0],
            y: translation[1],
            z: translation[2],
            timestamp,
        }
    }

    /// Returns the translation as `[x, y, z]`.
    #[must_use]
    pub const fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Timed for PoseSample {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// Gripper opening, already rescaled from raw driver units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GripperSample {
    /// Rescaled gripper position.
    pub value: f64,
    /// Record time.
    pub timestamp: Timestamp,
}

impl GripperSample {
    /// Creates a gripper sample from an already scaled value.
    #[must_use]
    pub const fn new(value: f64, timestamp: Timestamp) -> Self {
        Self { value, timestamp }
    }

    /// Creates a gripper sample by dividing a raw reading by `divisor`.
    ///
    /// # Example
    ///
    /// ```
    /// use traj_types::{GripperSample, Timestamp};
    ///
    /// let g = GripperSample::from_raw(42.0, 100.0, Timestamp::from_nanos(0));
    /// assert!((g.value - 0.42).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_raw(raw: f64, divisor: f64, timestamp: Timestamp) -> Self {
        Self {
            value: raw / divisor,
            timestamp,
        }
    }
}

impl Timed for GripperSample {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// One row of an aligned trajectory: a pose plus the gripper state in
/// effect at that moment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectoryRecord {
    /// X translation in meters.
    pub x: f64,
    /// Y translation in meters.
    pub y: f64,
    /// Z translation in meters.
    pub z: f64,
    /// Rescaled gripper position.
    pub gripper: f64,
    /// Pose record time.
    pub timestamp: Timestamp,
}

impl TrajectoryRecord {
    /// Joins a pose with the gripper sample matched to it. The pose's
    /// timestamp is kept.
    #[must_use]
    pub const fn join(pose: &PoseSample, gripper: &GripperSample) -> Self {
        Self {
            x: pose.x,
            y: pose.y,
            z: pose.z,
            gripper: gripper.value,
            timestamp: pose.timestamp,
        }
    }

    /// Returns true if no field is NaN.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        ![self.x, self.y, self.z, self.gripper].iter().any(|v| v.is_nan())
    }
}

impl Timed for TrajectoryRecord {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}
