#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

//! A fixed-capacity FIFO window with evict-oldest-on-full semantics.
//!
//! A [`RingBuffer`] keeps the most recent `capacity` items in arrival order.
//! When [`push`](RingBuffer::push) is called on a full buffer the oldest item
//! (logical index `0`) is removed and handed back to the caller, so owners can
//! log or account for what fell out of the window.
//!
//! # Complexity
//! - `push`, `len`, `is_empty`, `is_full` and `capacity` are **O(1)**;
//!   `to_vec` is **O(n)**.
//!
//! # Panic Safety
//! - No `unwrap`/`expect` in the implementation; a zero capacity is clamped to
//!   one slot instead of panicking.

use std::collections::VecDeque;

/// A fixed-capacity buffer storing elements in first-in-first-out order.
///
/// # Examples
///
/// ```rust
/// use chatcal_common::collections::RingBuffer;
///
/// let mut buffer = RingBuffer::new(3);
/// for value in 1..=4 {
///     buffer.push(value);
/// }
///
/// assert_eq!(buffer.to_vec(), vec![2, 3, 4]);
/// assert!(buffer.is_full());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingBuffer<T> {
    buf: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Creates a new buffer with the provided capacity.
    ///
    /// A capacity of zero is clamped to `1`.
    #[inline]
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { buf: VecDeque::with_capacity(capacity), capacity }
    }

    /// Appends an item, returning the evicted oldest item when the buffer was
    /// already full.
    #[inline]
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() { self.buf.pop_front() } else { None };
        self.buf.push_back(item);
        evicted
    }

    /// Returns the number of items currently stored.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` when the buffer has no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns `true` when the next push will evict.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Returns the maximum number of items the buffer can hold.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns an iterator visiting elements from oldest to newest.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf.iter()
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copies the window into a `Vec`, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.buf.iter().cloned().collect()
    }
}

impl<T> Default for RingBuffer<T> {
    /// Creates a single-slot buffer.
    #[inline]
    fn default() -> Self {
        Self::new(1)
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.buf.iter()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for collections::ring_buffer.
    use super::RingBuffer;

    /// Validates the eleventh push evicts the first item and keeps arrival
    /// order.
    #[test]
    fn eleventh_push_evicts_oldest() {
        let mut buffer = RingBuffer::new(10);
        for value in 0..10 {
            assert_eq!(buffer.push(value), None);
        }

        assert_eq!(buffer.push(10), Some(0));
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.to_vec(), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn iter_preserves_order_after_wraparound() {
        let mut buffer = RingBuffer::new(3);
        for value in 0..5 {
            buffer.push(value);
        }

        let collected: Vec<_> = buffer.iter().copied().collect();
        assert_eq!(collected, vec![2, 3, 4]);

        let collected_ref: Vec<_> = (&buffer).into_iter().copied().collect();
        assert_eq!(collected_ref, vec![2, 3, 4]);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut buffer = RingBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);

        buffer.push("first");
        assert!(buffer.is_full());
        assert_eq!(buffer.push("second"), Some("first"));
        assert_eq!(buffer.to_vec(), vec!["second"]);
    }
}
