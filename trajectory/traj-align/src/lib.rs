//! Timestamp alignment for trajectory streams.
//!
//! This crate joins independently sampled streams on their capture time:
//!
//! # Tables
//!
//! - [`SampleTable`] - Time-ordered table with stable insertion
//!
//! # Joins
//!
//! - [`merge_asof`] - Backward nearest-timestamp join, one match per left row
//! - [`merge_asof_dropna`] - Same join, combining matches and dropping
//!   unmatched rows
//! - [`AsofConfig`] - Exact-match and tolerance options
//!
//! # Example
//!
//! ```
//! use traj_align::{merge_asof_dropna, AsofConfig, SampleTable};
//! use traj_types::{GripperSample, PoseSample, Timestamp, TrajectoryRecord};
//!
//! let poses = vec![
//!     PoseSample::new([0.1, 0.2, 0.3], Timestamp::from_nanos(100)),
//!     PoseSample::new([0.4, 0.5, 0.6], Timestamp::from_nanos(300)),
//! ];
//!
//! let mut grippers = SampleTable::new();
//! grippers.push(GripperSample::new(0.1, Timestamp::from_nanos(50)));
//! grippers.push(GripperSample::new(0.9, Timestamp::from_nanos(250)));
//!
//! let rows = merge_asof_dropna(&poses, &grippers, &AsofConfig::default(), TrajectoryRecord::join);
//!
//! assert_eq!(rows.len(), 2);
//! assert!((rows[1].gripper - 0.9).abs() < 1e-12);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod asof;
mod table;

// Re-export table types
pub use table::SampleTable;

// Re-export join functions
pub use asof::{AsofConfig, match_backward, merge_asof, merge_asof_dropna};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{AsofConfig, SampleTable, merge_asof, merge_asof_dropna};
}
