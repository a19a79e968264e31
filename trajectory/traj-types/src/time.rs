//! Time types for log records.
//!
//! Log containers stamp every record with nanoseconds since the UNIX epoch.
//! [`Timestamp`] keeps that integer representation so alignment compares
//! exact values, and [`TargetZone`] renders it as a zoned calendar time.

use std::fmt;

use chrono::{DateTime, FixedOffset, Offset, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TypesError};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Nanosecond-precision timestamp since the UNIX epoch.
///
/// # Example
///
/// ```
/// use traj_types::Timestamp;
///
/// let ts = Timestamp::from_secs_nanos(1_700_000_000, 250_000_000);
/// assert_eq!(ts.secs(), 1_700_000_000);
/// assert_eq!(ts.subsec_nanos(), 250_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamp {
    nanos: u64,
}

impl Timestamp {
    /// Creates a timestamp from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Creates a timestamp from whole seconds and a nanosecond remainder.
    #[must_use]
    pub const fn from_secs_nanos(secs: u64, nanos: u32) -> Self {
        Self {
            nanos: secs * NANOS_PER_SEC + nanos as u64,
        }
    }

    /// Returns the timestamp as nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// Returns the timestamp as seconds (floating point).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }

    /// Returns the whole seconds component.
    #[must_use]
    pub const fn secs(self) -> u64 {
        self.nanos / NANOS_PER_SEC
    }

    /// Returns the subsecond nanoseconds component.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn subsec_nanos(self) -> u32 {
        (self.nanos % NANOS_PER_SEC) as u32
    }

    /// Subtracts a duration from this timestamp.
    ///
    /// Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(self, duration: Duration) -> Option<Self> {
        match self.nanos.checked_sub(duration.as_nanos()) {
            Some(nanos) => Some(Self { nanos }),
            None => None,
        }
    }

    /// Returns the absolute distance between two timestamps.
    #[must_use]
    pub const fn abs_diff(self, other: Self) -> Duration {
        Duration::from_nanos(self.nanos.abs_diff(other.nanos))
    }

    /// Converts to a UTC calendar time.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidTimestamp`] if the value is outside the
    /// range `chrono` can represent.
    pub fn to_utc(self) -> Result<DateTime<Utc>> {
        let secs = i64::try_from(self.secs())
            .map_err(|_| TypesError::invalid_timestamp(format!("{} ns", self.nanos)))?;
        DateTime::<Utc>::from_timestamp(secs, self.subsec_nanos())
            .ok_or_else(|| TypesError::invalid_timestamp(format!("{} ns", self.nanos)))
    }

    /// Returns the timestamp unchanged if it has a UTC calendar form.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidTimestamp`] as [`Timestamp::to_utc`] does.
    pub fn validated(self) -> Result<Self> {
        self.to_utc().map(|_| self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs(), self.subsec_nanos())
    }
}

/// A non-negative span of time with nanosecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Duration {
    nanos: u64,
}

impl Duration {
    /// Creates a duration from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Creates a duration from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            nanos: millis * 1_000_000,
        }
    }

    /// Creates a duration from seconds (floating point). Negative input clamps to zero.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self {
            nanos: (secs * 1e9).max(0.0) as u64,
        }
    }

    /// Returns the duration as nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// Returns the duration as seconds (floating point).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }
}

/// Anything carrying a capture time.
pub trait Timed {
    /// Capture time of the sample.
    fn timestamp(&self) -> Timestamp;
}

/// Named fixed-offset zone used to render timestamps.
///
/// The abbreviations follow the fixed-offset zones of the tz database, so
/// `EST` is always UTC−05:00 and never observes daylight saving.
///
/// # Example
///
/// ```
/// use traj_types::{TargetZone, Timestamp};
///
/// let zone = TargetZone::est();
/// let local = zone.localize(Timestamp::from_secs_nanos(0, 0)).unwrap();
/// assert_eq!(local.to_rfc3339(), "1969-12-31T19:00:00-05:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct TargetZone {
    name: String,
    offset: FixedOffset,
}

impl TargetZone {
    /// UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self {
            name: "UTC".to_string(),
            offset: Utc.fix(),
        }
    }

    /// Eastern Standard Time, UTC−05:00 all year.
    #[must_use]
    pub fn est() -> Self {
        Self::fixed_hours("EST", -5)
    }

    /// Parses a zone abbreviation (`UTC`, `GMT`, `EST`, `MST`, `HST`) or a
    /// numeric offset such as `+09:00` or `-0330`.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidZone`] if the name is not recognized.
    pub fn parse(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "UTC" | "GMT" | "Z" => return Ok(Self::utc()),
            "EST" => return Ok(Self::est()),
            "MST" => return Ok(Self::fixed_hours("MST", -7)),
            "HST" => return Ok(Self::fixed_hours("HST", -10)),
            _ => {}
        }

        let offset = trimmed
            .parse::<FixedOffset>()
            .map_err(|_| TypesError::invalid_zone(trimmed))?;
        Ok(Self {
            name: offset.to_string(),
            offset,
        })
    }

    fn fixed_hours(name: &str, hours: i32) -> Self {
        Self {
            name: name.to_string(),
            offset: FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }

    /// Zone name as given (or the canonical offset for numeric zones).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The zone's offset from UTC.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Converts a timestamp to UTC, then into this zone.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidTimestamp`] if the timestamp has no
    /// calendar representation.
    pub fn localize(&self, timestamp: Timestamp) -> Result<DateTime<FixedOffset>> {
        Ok(timestamp.to_utc()?.with_timezone(&self.offset))
    }
}

impl Default for TargetZone {
    fn default() -> Self {
        Self::est()
    }
}

impl fmt::Display for TargetZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl TryFrom<String> for TargetZone {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TargetZone> for String {
    fn from(zone: TargetZone) -> Self {
        zone.name
    }
}
