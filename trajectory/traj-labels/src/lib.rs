//! Ground-truth segmentation lookup.
//!
//! Label files are JSON arrays with one object per recording, keyed by the
//! recording's file name:
//!
//! ```json
//! [
//!   {"filename": "session_01.bag", "segments": [[0, 412], [412, 980]]},
//!   {"filename": "session_02.bag", "segments": [[0, 655]]}
//! ]
//! ```
//!
//! - [`get_ground_truth_segmentation`] - One-shot lookup for a recording
//! - [`GroundTruthFile`] - Parsed file for repeated lookups
//!
//! Entries are returned as raw [`serde_json::Value`]s.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod ground_truth;

pub use error::{LabelError, Result};
pub use ground_truth::{FILENAME_KEY, GroundTruthFile, get_ground_truth_segmentation};
