//! End-effector trajectory extraction.
//!
//! Reads transform and gripper messages from one topic, keeps the
//! end-effector translation and the rescaled gripper reading, and joins each
//! pose to the latest gripper reading at or before it.

use std::path::Path;

use tracing::{debug, info};
use traj_align::{SampleTable, merge_asof_dropna};
use traj_types::{GripperSample, PoseSample, Trajectory, TrajectoryRecord};

use crate::config::ExtractConfig;
use crate::error::Result;
use crate::msg::{TfMessage, numeric_field};
use crate::reader::BagReader;
use crate::source::MessageSource;

/// Counters collected during one extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Messages read on the selected topic.
    pub messages: usize,
    /// Transform messages seen.
    pub transforms_seen: usize,
    /// Transform messages whose first transform matched the frame pair.
    pub transforms_accepted: usize,
    /// Gripper readings collected.
    pub gripper_samples: usize,
    /// Messages of other types on the topic.
    pub other_messages: usize,
    /// Poses dropped because no gripper reading preceded them.
    pub rows_dropped: usize,
    /// Joined rows dropped because a field was NaN.
    pub rows_incomplete: usize,
}

/// Logs progress every tenth of the total.
struct Progress {
    total: usize,
    done: usize,
    last_decile: usize,
}

impl Progress {
    const fn new(total: usize) -> Self {
        Self {
            total,
            done: 0,
            last_decile: 0,
        }
    }

    fn tick(&mut self) {
        self.done += 1;
        if self.total == 0 {
            return;
        }
        let decile = self.done * 10 / self.total;
        if decile > self.last_decile {
            self.last_decile = decile;
            info!(done = self.done, total = self.total, "{}%", decile * 10);
        }
    }
}

/// Extracts the end-effector trajectory from a bag with default settings.
///
/// # Errors
///
/// See [`extract_from_source`]; also fails if the bag cannot be opened.
pub fn extract_eef_trajectory(path: impl AsRef<Path>) -> Result<Trajectory> {
    extract_eef_trajectory_with(path, &ExtractConfig::default())
}

/// Extracts the end-effector trajectory from a bag.
///
/// The bag is closed before this returns, on success or error.
///
/// # Errors
///
/// See [`extract_from_source`]; also fails if the bag cannot be opened.
pub fn extract_eef_trajectory_with(
    path: impl AsRef<Path>,
    config: &ExtractConfig,
) -> Result<Trajectory> {
    config.validate()?;
    let reader = BagReader::open_with_store(path, config.store)?;
    let (trajectory, _) = extract_from_source(&reader, config)?;
    Ok(trajectory)
}

/// Extracts the end-effector trajectory from any message source.
///
/// Every message on `config.topic` is decoded. For transform messages only
/// the first transform is consulted, and it is kept only if it links
/// `config.child_frame` to `config.parent_frame`. Gripper readings are
/// divided by `config.gripper_divisor`. Timestamps are record times.
///
/// Messages arrive in time order, so output rows are chronological. Poses
/// with no earlier gripper reading are dropped, as are joined rows with a
/// NaN field.
///
/// # Errors
///
/// - [`crate::BagError::InvalidConfig`] if `config` is invalid
/// - [`crate::BagError::UnknownMessageType`] if a message on the topic has
///   no schema
/// - [`crate::BagError::Decode`] if a payload does not match its schema or
///   a transform message is empty
/// - [`crate::BagError::Types`] if a record time has no calendar form
pub fn extract_from_source<S>(source: &S, config: &ExtractConfig) -> Result<(Trajectory, ExtractStats)>
where
    S: MessageSource + ?Sized,
{
    config.validate()?;
    info!("Extracting TF & gripper data from bag file...");

    let transform_type = config.transform_msgtype();
    let gripper_type = config.gripper_msgtype();
    let ids: Vec<u32> = source
        .connections_on(&config.topic)
        .iter()
        .map(|c| c.id)
        .collect();

    let total = source.count_messages(&ids)?;
    debug!(topic = %config.topic, connections = ids.len(), messages = total, "selected topic");

    let mut stats = ExtractStats::default();
    let mut progress = Progress::new(total);
    let mut poses: Vec<PoseSample> = Vec::new();
    let mut grippers: Vec<GripperSample> = Vec::new();

    source.visit_messages(&ids, &mut |raw| {
        stats.messages += 1;
        progress.tick();

        let value = source.deserialize(&raw)?;
        let msgtype = raw.connection.msgtype.as_str();

        if msgtype == transform_type {
            stats.transforms_seen += 1;
            let tf = TfMessage::try_from(&value)?;
            let first = tf.first()?;
            if first.links(&config.child_frame, &config.parent_frame) {
                let time = raw.time.validated()?;
                let t = first.transform.translation;
                poses.push(PoseSample::new([t.x, t.y, t.z], time));
                stats.transforms_accepted += 1;
            }
        } else if msgtype == gripper_type {
            let reading = numeric_field(&value, &config.gripper_field)?;
            let time = raw.time.validated()?;
            grippers.push(GripperSample::from_raw(reading, config.gripper_divisor, time));
            stats.gripper_samples += 1;
        } else {
            stats.other_messages += 1;
        }
        Ok(())
    })?;

    let table: SampleTable<GripperSample> = grippers.into_iter().collect();
    let mut rows = merge_asof_dropna(&poses, &table, &config.asof, TrajectoryRecord::join);
    stats.rows_dropped = poses.len() - rows.len();

    let joined = rows.len();
    rows.retain(TrajectoryRecord::is_complete);
    stats.rows_incomplete = joined - rows.len();

    let trajectory = Trajectory::from_records(config.zone.clone(), rows);
    info!(
        rows = trajectory.len(),
        poses = stats.transforms_accepted,
        grippers = stats.gripper_samples,
        dropped = stats.rows_dropped,
        incomplete = stats.rows_incomplete,
        "Extracting TF & gripper data from bag file: done"
    );
    Ok((trajectory, stats))
}
