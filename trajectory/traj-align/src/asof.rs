//! Backward as-of join.
//!
//! Each left row is matched to the right sample with the greatest timestamp
//! that does not exceed its own. The left side keeps its original order and
//! is not required to be sorted; the right side is a [`SampleTable`], which
//! is always time-ordered.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;
use traj_types::{Duration, Timed, Timestamp};

use crate::table::SampleTable;

/// Options for the backward as-of join.
///
/// The default matches on `right.timestamp <= left.timestamp` with no
/// distance limit.
///
/// # Example
///
/// ```
/// use traj_align::AsofConfig;
/// use traj_types::Duration;
///
/// let config = AsofConfig::default().with_tolerance(Duration::from_millis(50));
/// assert!(config.allow_exact_matches);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AsofConfig {
    /// Whether a right sample with exactly the left timestamp may match.
    /// When false only strictly earlier samples match.
    pub allow_exact_matches: bool,

    /// Maximum distance between the left timestamp and its match.
    pub tolerance: Option<Duration>,
}

impl Default for AsofConfig {
    fn default() -> Self {
        Self {
            allow_exact_matches: true,
            tolerance: None,
        }
    }
}

impl AsofConfig {
    /// Only match right samples strictly before the left timestamp.
    #[must_use]
    pub const fn strictly_before() -> Self {
        Self {
            allow_exact_matches: false,
            tolerance: None,
        }
    }

    /// Sets whether exact timestamp matches are allowed.
    #[must_use]
    pub const fn with_allow_exact_matches(mut self, allow: bool) -> Self {
        self.allow_exact_matches = allow;
        self
    }

    /// Sets the maximum match distance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
}

/// Finds the right sample matched to `ts`.
///
/// Among samples sharing the matched timestamp, the last one inserted wins.
#[must_use]
pub fn match_backward<'a, R: Timed>(
    right: &'a SampleTable<R>,
    ts: Timestamp,
    config: &AsofConfig,
) -> Option<&'a R> {
    let index = if config.allow_exact_matches {
        right.index_at_or_before(ts)
    } else {
        right.index_before(ts)
    }?;
    let sample = right.get(index)?;

    match config.tolerance {
        Some(tolerance) if ts.abs_diff(sample.timestamp()) > tolerance => None,
        _ => Some(sample),
    }
}

/// Matches every left row, keeping unmatched rows as `None`.
///
/// The output has one entry per left row, in left order.
///
/// # Example
///
/// ```
/// use traj_align::{merge_asof, AsofConfig, SampleTable};
/// use traj_types::{GripperSample, PoseSample, Timestamp};
///
/// let poses = [
///     PoseSample::new([0.0; 3], Timestamp::from_nanos(5)),
///     PoseSample::new([1.0; 3], Timestamp::from_nanos(15)),
/// ];
/// let grippers: SampleTable<_> = [GripperSample::new(0.5, Timestamp::from_nanos(10))]
///     .into_iter()
///     .collect();
///
/// let matched = merge_asof(&poses, &grippers, &AsofConfig::default());
/// assert!(matched[0].is_none());
/// assert_eq!(matched[1].map(|g| g.value), Some(0.5));
/// ```
#[must_use]
pub fn merge_asof<'a, L: Timed, R: Timed>(
    left: &[L],
    right: &'a SampleTable<R>,
    config: &AsofConfig,
) -> Vec<Option<&'a R>> {
    left.iter()
        .map(|row| match_backward(right, row.timestamp(), config))
        .collect()
}

/// Matches every left row, combines matched pairs and drops unmatched rows.
///
/// Output keeps left order. Its length is at most `left.len()`.
pub fn merge_asof_dropna<L, R, O, F>(
    left: &[L],
    right: &SampleTable<R>,
    config: &AsofConfig,
    mut combine: F,
) -> Vec<O>
where
    L: Timed,
    R: Timed,
    F: FnMut(&L, &R) -> O,
{
    let mut out = Vec::with_capacity(left.len());
    for row in left {
        if let Some(matched) = match_backward(right, row.timestamp(), config) {
            out.push(combine(row, matched));
        }
    }

    debug!(
        left = left.len(),
        right = right.len(),
        matched = out.len(),
        dropped = left.len() - out.len(),
        "as-of join complete"
    );
    out
}
