//! A single padded accumulator stripe.

use std::sync::atomic::{AtomicI64, Ordering};

use crossbeam_utils::CachePadded;

/// One stripe of a [`StripedAdder`](super::StripedAdder).
///
/// The value is wrapped in [`CachePadded`] so that two cells sitting next to
/// each other in a table never end up on the same cache line. Cells are shared
/// between successive tables, so a grown table keeps pointing at the very same
/// cells the previous one used.
///
/// All operations use `Ordering::Relaxed`: a cell only carries a partial sum and
/// never publishes other memory.
pub(crate) struct Cell {
    value: CachePadded<AtomicI64>,
}

impl Cell {
    /// Creates a cell holding `value`.
    pub(crate) const fn new(value: i64) -> Self {
        Cell {
            value: CachePadded::new(AtomicI64::new(value)),
        }
    }

    /// Returns the current value.
    #[inline]
    pub(crate) fn load(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Replaces `current` with `new`, returning whether the swap happened.
    #[inline]
    pub(crate) fn compare_and_swap(&self, current: i64, new: i64) -> bool {
        self.value
            .compare_exchange(current, new, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    /// Stores `value` unconditionally.
    #[inline]
    pub(crate) fn reset(&self, value: i64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Stores `value` and returns what the cell held before.
    #[inline]
    pub(crate) fn get_and_set(&self, value: i64) -> i64 {
        self.value.swap(value, Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.load())
    }
}
