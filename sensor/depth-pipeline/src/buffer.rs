//! Time-ordered buffer keyed by sensor clock timestamps.

use std::collections::VecDeque;

use depth_types::Timestamp;

/// A bounded, time-ordered buffer of timestamped samples.
///
/// Samples must arrive in non-decreasing timestamp order; out-of-order pushes
/// are rejected so that [`find_bracket`](Self::find_bracket) can binary
/// search.
///
/// # Example
///
/// ```
/// use depth_pipeline::StreamBuffer;
/// use depth_types::Timestamp;
///
/// let mut buffer: StreamBuffer<u32> = StreamBuffer::new(100);
/// assert!(buffer.push(Timestamp::from_ticks(0), 1));
/// assert!(buffer.push(Timestamp::from_ticks(10), 2));
/// assert!(!buffer.push(Timestamp::from_ticks(5), 3));
///
/// assert_eq!(buffer.len(), 2);
/// assert_eq!(buffer.find_bracket(Timestamp::from_ticks(5)), Some((0, 1)));
/// ```
#[derive(Debug, Clone)]
pub struct StreamBuffer<T> {
    capacity: usize,
    samples: VecDeque<(Timestamp, T)>,
}

impl<T> StreamBuffer<T> {
    /// Creates a new buffer holding at most `capacity` samples (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            samples: VecDeque::with_capacity(capacity.clamp(1, 1024)),
        }
    }

    /// Returns the capacity of the buffer.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of samples in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns true if the buffer is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    /// Clears all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Pushes a sample, evicting the oldest one when at capacity.
    ///
    /// Returns `false` and leaves the buffer untouched if `timestamp` is
    /// older than the newest sample.
    pub fn push(&mut self, timestamp: Timestamp, value: T) -> bool {
        if self.samples.back().is_some_and(|(t, _)| timestamp < *t) {
            return false;
        }
        if self.is_full() {
            self.samples.pop_front();
        }
        self.samples.push_back((timestamp, value));
        true
    }

    /// Returns the oldest sample.
    #[must_use]
    pub fn oldest(&self) -> Option<&(Timestamp, T)> {
        self.samples.front()
    }

    /// Returns the newest sample.
    #[must_use]
    pub fn latest(&self) -> Option<&(Timestamp, T)> {
        self.samples.back()
    }

    /// Returns the timestamp range `(oldest, newest)`.
    #[must_use]
    pub fn timestamp_range(&self) -> Option<(Timestamp, Timestamp)> {
        Some((self.samples.front()?.0, self.samples.back()?.0))
    }

    /// Finds samples bracketing the given timestamp.
    ///
    /// Returns indices `(before, after)`; both are equal on an exact hit.
    /// Returns `None` if `timestamp` is outside the buffered range.
    #[must_use]
    pub fn find_bracket(&self, timestamp: Timestamp) -> Option<(usize, usize)> {
        let (min, max) = self.timestamp_range()?;
        if timestamp < min || timestamp > max {
            return None;
        }

        // First sample at or after `timestamp`
        let lo = self.samples.partition_point(|(t, _)| *t < timestamp);

        if lo >= self.samples.len() {
            let last = self.samples.len() - 1;
            Some((last, last))
        } else if lo == 0 || self.samples[lo].0 == timestamp {
            Some((lo, lo))
        } else {
            Some((lo - 1, lo))
        }
    }

    /// Gets a sample by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&(Timestamp, T)> {
        self.samples.get(index)
    }

    /// Returns an iterator over all samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &(Timestamp, T)> {
        self.samples.iter()
    }

    /// Removes samples older than the given timestamp.
    pub fn remove_before(&mut self, timestamp: Timestamp) {
        while self.samples.front().is_some_and(|(t, _)| *t < timestamp) {
            self.samples.pop_front();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn ts(ticks: u64) -> Timestamp {
        Timestamp::from_ticks(ticks)
    }

    fn filled() -> StreamBuffer<u32> {
        let mut buffer = StreamBuffer::new(10);
        for (i, t) in [0, 10, 20, 30].into_iter().enumerate() {
            assert!(buffer.push(ts(t), u32::try_from(i).unwrap()));
        }
        buffer
    }

    #[test]
    fn buffer_min_capacity() {
        let buffer: StreamBuffer<u32> = StreamBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn buffer_push_overflow() {
        let mut buffer = StreamBuffer::new(3);
        buffer.push(ts(0), 1);
        buffer.push(ts(1), 2);
        buffer.push(ts(2), 3);
        assert!(buffer.is_full());

        buffer.push(ts(3), 4);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.oldest().unwrap().1, 2);
        assert_eq!(buffer.latest().unwrap().1, 4);
    }

    #[test]
    fn buffer_rejects_out_of_order() {
        let mut buffer = filled();
        assert!(!buffer.push(ts(15), 99));
        assert_eq!(buffer.len(), 4);

        // Equal timestamps are allowed
        assert!(buffer.push(ts(30), 7));
    }

    #[test]
    fn buffer_find_bracket() {
        let buffer = filled();

        assert_eq!(buffer.find_bracket(ts(10)), Some((1, 1)));
        assert_eq!(buffer.find_bracket(ts(15)), Some((1, 2)));
        assert_eq!(buffer.find_bracket(ts(0)), Some((0, 0)));
        assert_eq!(buffer.find_bracket(ts(30)), Some((3, 3)));
        assert!(buffer.find_bracket(ts(31)).is_none());
    }

    #[test]
    fn buffer_find_bracket_before_start() {
        let mut buffer = StreamBuffer::new(4);
        buffer.push(ts(100), 1);
        assert!(buffer.find_bracket(ts(99)).is_none());
        assert_eq!(buffer.find_bracket(ts(100)), Some((0, 0)));
    }

    #[test]
    fn buffer_find_bracket_empty() {
        let buffer: StreamBuffer<u32> = StreamBuffer::new(4);
        assert!(buffer.find_bracket(ts(0)).is_none());
        assert!(buffer.timestamp_range().is_none());
    }

    #[test]
    fn buffer_iter_and_get() {
        let buffer = filled();
        let values: Vec<u32> = buffer.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![0, 1, 2, 3]);
        assert_eq!(buffer.get(2).unwrap().0, ts(20));
        assert!(buffer.get(4).is_none());
    }

    #[test]
    fn buffer_remove_before() {
        let mut buffer = filled();
        buffer.remove_before(ts(15));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.oldest().unwrap().0, ts(20));

        buffer.clear();
        assert!(buffer.is_empty());
    }
}
