//! Time-sorted sample table.

use traj_types::{Timed, Timestamp};

/// A table of samples kept in timestamp order.
///
/// Insertion is stable: a sample whose timestamp equals existing entries is
/// placed after them, so samples with equal timestamps keep arrival order.
/// Appending in time order is O(1).
///
/// # Example
///
/// ```
/// use traj_align::SampleTable;
/// use traj_types::{GripperSample, Timestamp};
///
/// let mut table = SampleTable::new();
/// table.push(GripperSample::new(0.2, Timestamp::from_nanos(20)));
/// table.push(GripperSample::new(0.1, Timestamp::from_nanos(10)));
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.oldest().unwrap().value, 0.1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable<T> {
    samples: Vec<T>,
}

impl<T> Default for SampleTable<T> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
        }
    }
}

impl<T: Timed> SampleTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table with room for `capacity` samples.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Inserts a sample at its time-ordered position, after any samples
    /// with an equal timestamp.
    pub fn push(&mut self, sample: T) {
        let ts = sample.timestamp();
        match self.samples.last() {
            Some(last) if last.timestamp() > ts => {
                let index = self.samples.partition_point(|s| s.timestamp() <= ts);
                self.samples.insert(index, sample);
            }
            _ => self.samples.push(sample),
        }
    }

    /// Gets a sample by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.samples.get(index)
    }

    /// Returns an iterator over samples in time order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.samples.iter()
    }

    /// Returns the samples as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.samples
    }

    /// Returns the oldest sample.
    #[must_use]
    pub fn oldest(&self) -> Option<&T> {
        self.samples.first()
    }

    /// Returns the newest sample.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.samples.last()
    }

    /// Returns the timestamp range `(min, max)`.
    ///
    /// Returns `None` if the table is empty.
    #[must_use]
    pub fn timestamp_range(&self) -> Option<(Timestamp, Timestamp)> {
        Some((self.oldest()?.timestamp(), self.latest()?.timestamp()))
    }

    /// Index of the last sample with timestamp `<= ts`.
    #[must_use]
    pub fn index_at_or_before(&self, ts: Timestamp) -> Option<usize> {
        self.samples
            .partition_point(|s| s.timestamp() <= ts)
            .checked_sub(1)
    }

    /// Index of the last sample with timestamp `< ts`.
    #[must_use]
    pub fn index_before(&self, ts: Timestamp) -> Option<usize> {
        self.samples
            .partition_point(|s| s.timestamp() < ts)
            .checked_sub(1)
    }

    /// Returns the last sample with timestamp `<= ts`.
    #[must_use]
    pub fn find_at_or_before(&self, ts: Timestamp) -> Option<&T> {
        self.index_at_or_before(ts).and_then(|i| self.samples.get(i))
    }

    /// Consumes the table, returning the samples in time order.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.samples
    }
}

impl<T: Timed> FromIterator<T> for SampleTable<T> {
    /// Collects samples and sorts them stably by timestamp.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut samples: Vec<T> = iter.into_iter().collect();
        samples.sort_by_key(Timed::timestamp);
        Self { samples }
    }
}

impl<T: Timed> Extend<T> for SampleTable<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for sample in iter {
            self.push(sample);
        }
    }
}

impl<'a, T> IntoIterator for &'a SampleTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
