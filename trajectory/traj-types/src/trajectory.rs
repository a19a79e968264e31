//! Aligned trajectory table.

use std::io::Write;

use chrono::{DateTime, FixedOffset, SecondsFormat};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sample::TrajectoryRecord;
use crate::time::{TargetZone, Timestamp};

/// Column names, in export order.
pub const COLUMNS: [&str; 5] = ["x", "y", "z", "gripper", "timestamp"];

/// Ordered table of aligned `{x, y, z, gripper, timestamp}` rows.
///
/// Rows keep pose-sample order. Timestamps are stored as absolute instants
/// and rendered in the table's [`TargetZone`].
///
/// # Example
///
/// ```
/// use traj_types::{TargetZone, Timestamp, Trajectory, TrajectoryRecord};
///
/// let mut traj = Trajectory::new(TargetZone::est());
/// traj.push(TrajectoryRecord {
///     x: 0.1, y: 0.2, z: 0.3, gripper: 0.5,
///     timestamp: Timestamp::from_nanos(0),
/// });
///
/// assert_eq!(traj.len(), 1);
/// assert_eq!(traj.gripper(), vec![0.5]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trajectory {
    zone: TargetZone,
    records: Vec<TrajectoryRecord>,
}

impl Trajectory {
    /// Creates an empty trajectory rendered in `zone`.
    #[must_use]
    pub const fn new(zone: TargetZone) -> Self {
        Self {
            zone,
            records: Vec::new(),
        }
    }

    /// Creates a trajectory from rows already in order.
    #[must_use]
    pub const fn from_records(zone: TargetZone, records: Vec<TrajectoryRecord>) -> Self {
        Self { zone, records }
    }

    /// Appends a row.
    pub fn push(&mut self, record: TrajectoryRecord) {
        self.records.push(record);
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Zone used to render timestamps.
    #[must_use]
    pub const fn zone(&self) -> &TargetZone {
        &self.zone
    }

    /// All rows.
    #[must_use]
    pub fn records(&self) -> &[TrajectoryRecord] {
        &self.records
    }

    /// Row at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TrajectoryRecord> {
        self.records.get(index)
    }

    /// Iterates over rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, TrajectoryRecord> {
        self.records.iter()
    }

    /// The `x` column.
    #[must_use]
    pub fn x(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.x).collect()
    }

    /// The `y` column.
    #[must_use]
    pub fn y(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.y).collect()
    }

    /// The `z` column.
    #[must_use]
    pub fn z(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.z).collect()
    }

    /// The `gripper` column.
    #[must_use]
    pub fn gripper(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.gripper).collect()
    }

    /// The `timestamp` column as raw instants.
    #[must_use]
    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    /// The `timestamp` column rendered in the table's zone.
    ///
    /// # Errors
    ///
    /// Returns an error if any timestamp has no calendar representation.
    pub fn local_timestamps(&self) -> Result<Vec<DateTime<FixedOffset>>> {
        self.records
            .iter()
            .map(|r| self.zone.localize(r.timestamp))
            .collect()
    }

    /// First and last timestamps, or `None` if empty.
    #[must_use]
    pub fn time_span(&self) -> Option<(Timestamp, Timestamp)> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some((first.timestamp, last.timestamp))
    }

    /// Writes the table as CSV with a header row.
    ///
    /// Timestamps are written as RFC 3339 in the table's zone with
    /// nanosecond precision.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or a timestamp cannot be rendered.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(COLUMNS)?;

        for record in &self.records {
            let local = self.zone.localize(record.timestamp)?;
            csv.write_record([
                record.x.to_string(),
                record.y.to_string(),
                record.z.to_string(),
                record.gripper.to_string(),
                local.to_rfc3339_opts(SecondsFormat::Nanos, false),
            ])?;
        }

        csv.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryRecord;
    type IntoIter = std::slice::Iter<'a, TrajectoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
