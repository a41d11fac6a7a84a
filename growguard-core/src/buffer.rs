//! Fixed-Size Circular Buffer for Reading History
//!
//! ## Overview
//!
//! A circular (ring) buffer with its capacity fixed at compile time through a
//! const generic. The serving boundary keeps its recent-reading history in one
//! so that memory use is bounded no matter how long the process runs.
//!
//! ## Design Rationale
//!
//! ### Why a Circular Buffer?
//!
//! Dashboards and statistics only care about the most recent readings:
//! - O(1) insertion (overwrites oldest when full)
//! - O(1) access to most recent entry
//! - O(n) iteration in chronological order
//! - No reallocation after construction
//!
//! ### Why Not a `VecDeque`?
//!
//! 1. **Automatic Overwrite**: When full, we want to discard old data silently
//!    rather than grow or return an error. Recent readings are worth more than
//!    old ones.
//!
//! 2. **Bounded by Type**: The capacity is part of the type, so the history
//!    limit cannot drift away from what the API documents.
//!
//! 3. **Works Without `std`**: The same buffer is usable on the sensor node.
//!
//! ### Memory Layout
//!
//! ```text
//! CircularBuffer<T, 5>:
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  0  │  1  │  2  │  3  │  4  │  ← Array indices
//! └─────┴─────┴─────┴─────┴─────┘
//!    ↑                       ↑
//!    └── write_pos = 0      └── After 5 writes, wraps here
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use growguard_core::buffer::CircularBuffer;
//!
//! let mut history: CircularBuffer<f64, 3> = CircularBuffer::new();
//! for value in [6.1, 6.2, 6.3, 6.4] {
//!     history.push(value);
//! }
//!
//! // Oldest value (6.1) was evicted
//! let values: Vec<f64> = history.iter().copied().collect();
//! assert_eq!(values, vec![6.2, 6.3, 6.4]);
//! assert_eq!(history.last(), Some(&6.4));
//! ```

/// Fixed-size circular buffer for time-ordered entries
///
/// ## Internal Invariants
///
/// - `write_pos < N` (next write position is always valid)
/// - `len <= N` (never claim to have more items than capacity)
/// - Items iterate in insertion order, oldest first
///
/// ## Thread Safety
///
/// This type is not thread-safe. Shared owners wrap it in a mutex.
#[derive(Clone, Debug)]
pub struct CircularBuffer<T, const N: usize> {
    /// Storage array using Option for unfilled slots
    data: [Option<T>; N],

    /// Index where the next write will occur
    write_pos: usize,

    /// Current number of valid entries
    len: usize,
}

impl<T, const N: usize> CircularBuffer<T, N> {
    /// Creates a new empty circular buffer
    pub fn new() -> Self {
        assert!(N > 0, "CircularBuffer capacity must be non-zero");
        Self {
            data: core::array::from_fn(|_| None),
            write_pos: 0,
            len: 0,
        }
    }

    /// Adds an entry, overwriting the oldest one when full
    pub fn push(&mut self, item: T) {
        self.data[self.write_pos] = Some(item);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Get number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Maximum number of entries
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Get the most recent entry
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }

        // Most recent is one before write position
        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };

        self.data[idx].as_ref()
    }

    /// Iterate over entries from oldest to newest
    pub fn iter(&self) -> CircularBufferIter<'_, T, N> {
        CircularBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        for slot in self.data.iter_mut() {
            *slot = None;
        }
        self.write_pos = 0;
        self.len = 0;
    }

    /// Gets an entry by its logical index (0 = oldest, len-1 = newest)
    ///
    /// ```text
    /// Physical array:  [D, E, A, B, C]  (write_pos = 2)
    /// Logical view:    [A, B, C, D, E]
    /// Mapping: logical[i] = physical[(write_pos + i) % N]
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < N {
            // Not full yet, data starts at 0
            index
        } else {
            // Full, oldest data is at write_pos
            (self.write_pos + index) % N
        };

        self.data[actual_index].as_ref()
    }
}

/// Iterator over circular buffer contents
pub struct CircularBufferIter<'a, T, const N: usize> {
    buffer: &'a CircularBuffer<T, N>,
    index: usize,
}

impl<'a, T, const N: usize> Iterator for CircularBufferIter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a, T, const N: usize> ExactSizeIterator for CircularBufferIter<'a, T, N> {}

impl<T, const N: usize> Default for CircularBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer() {
        let buffer: CircularBuffer<u32, 5> = CircularBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 5);
        assert!(buffer.last().is_none());
    }

    #[test]
    fn push_and_retrieve() {
        let mut buffer = CircularBuffer::<f64, 5>::new();

        buffer.push(25.0);
        assert_eq!(buffer.len(), 1);
        assert!(!buffer.is_empty());
        assert_eq!(buffer.last(), Some(&25.0));
    }

    #[test]
    fn circular_overwrite() {
        let mut buffer = CircularBuffer::<u32, 3>::new();

        for i in 0..5 {
            buffer.push(i);
        }

        // Should only have 3 items
        assert_eq!(buffer.len(), 3);
        assert!(buffer.is_full());

        // Oldest 0, 1 were overwritten
        let mut iter = buffer.iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next(), Some(&3));
        assert_eq!(iter.next(), Some(&4));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn logical_indexing_after_wrap() {
        let mut buffer = CircularBuffer::<u32, 4>::new();
        for i in 0..6 {
            buffer.push(i);
        }

        assert_eq!(buffer.get(0), Some(&2));
        assert_eq!(buffer.get(3), Some(&5));
        assert_eq!(buffer.get(4), None);
        assert_eq!(buffer.last(), Some(&5));
    }

    #[test]
    fn clear_resets() {
        let mut buffer = CircularBuffer::<u32, 2>::new();
        buffer.push(1);
        buffer.push(2);
        buffer.push(3);
        buffer.clear();

        assert!(buffer.is_empty());
        assert!(buffer.iter().next().is_none());

        buffer.push(7);
        assert_eq!(buffer.last(), Some(&7));
        assert_eq!(buffer.get(0), Some(&7));
    }
}
