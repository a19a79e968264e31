//! Core data types for end-effector trajectory datasets.
//!
//! This crate provides the shared vocabulary used by the bag extractor and
//! the alignment engine:
//!
//! # Time
//!
//! - [`Timestamp`] - Nanoseconds since the UNIX epoch, compared exactly
//! - [`Duration`] - Non-negative time span
//! - [`TargetZone`] - Fixed-offset zone used to render timestamps
//! - [`Timed`] - Anything carrying a capture time
//!
//! # Samples
//!
//! - [`PoseSample`] - End-effector translation at a record time
//! - [`GripperSample`] - Rescaled gripper opening at a record time
//! - [`TrajectoryRecord`] - A pose joined with the gripper state in effect
//!
//! # Tables
//!
//! - [`Trajectory`] - Ordered `{x, y, z, gripper, timestamp}` rows with CSV export
//!
//! # Example
//!
//! ```
//! use traj_types::{GripperSample, PoseSample, TargetZone, Timestamp, Trajectory, TrajectoryRecord};
//!
//! let pose = PoseSample::new([0.4, 0.0, 0.2], Timestamp::from_secs_nanos(10, 0));
//! let gripper = GripperSample::from_raw(50.0, 100.0, Timestamp::from_secs_nanos(9, 0));
//!
//! let mut traj = Trajectory::new(TargetZone::est());
//! traj.push(TrajectoryRecord::join(&pose, &gripper));
//!
//! assert_eq!(traj.len(), 1);
//! assert!((traj.gripper()[0] - 0.5).abs() < 1e-12);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod sample;
mod time;
mod trajectory;

// Re-export time types
pub use time::{Duration, TargetZone, Timed, Timestamp};

// Re-export sample types
pub use sample::{GripperSample, PoseSample, TrajectoryRecord};

// Re-export table types
pub use trajectory::{COLUMNS, Trajectory};

// Re-export error types
pub use error::{Result, TypesError};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Duration, GripperSample, PoseSample, TargetZone, Timed, Timestamp, Trajectory,
        TrajectoryRecord, TypesError,
    };
}
