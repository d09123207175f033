//! Striped 64-bit adder.
//!
//! This module provides [`LongAdder`], a signed counter that scales with the
//! number of concurrent writers. It starts as a single atomic and only spreads
//! out into padded cells once writers actually collide, so an uncontended
//! `LongAdder` costs barely more than an `AtomicI64`.

use std::fmt::Debug;

use crate::counters::{fmt_striped, Observable};
use crate::striped::probe::Probe;
use crate::striped::{stripe_cap, StripedAdder};

/// A high-throughput signed counter using adaptive striping.
///
/// Updates take a caller-owned [`Probe`] which selects the cell the caller
/// writes to once striping kicks in. Reads (`sum`, `reset`, `sum_then_reset`)
/// don't need one.
///
/// Arithmetic wraps on overflow, like `i64::wrapping_add`.
///
/// # Memory Usage
///
/// A fresh `LongAdder` holds no table at all. Under contention it grows to at
/// most one cache line per execution unit (rounded down to a power of two).
///
/// # Examples
///
/// ```rust
/// use stripe_adder::counters::long_adder::LongAdder;
/// use stripe_adder::striped::probe::Probe;
///
/// let counter = LongAdder::new().with_name("requests");
/// let mut probe = Probe::new();
///
/// for _ in 0..5 {
///     counter.increment(&mut probe);
/// }
/// counter.decrement(&mut probe);
/// counter.decrement(&mut probe);
///
/// assert_eq!(counter.sum(), 3);
/// ```
///
/// Counters can be `static`:
///
/// ```rust
/// use stripe_adder::counters::long_adder::LongAdder;
/// use stripe_adder::striped::probe::Probe;
///
/// static BYTES_SENT: LongAdder = LongAdder::new().with_name("bytes_sent");
///
/// let mut probe = Probe::new();
/// BYTES_SENT.add(&mut probe, 1500);
/// assert_eq!(BYTES_SENT.sum(), 1500);
/// ```
pub struct LongAdder {
    name: &'static str,
    core: StripedAdder,
}

impl LongAdder {
    /// Creates a new counter initialized to zero, with no cell table.
    pub const fn new() -> Self {
        LongAdder {
            name: "",
            core: StripedAdder::new(0, 0),
        }
    }

    /// Sets the name of this counter, returning `self` for method chaining.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stripe_adder::counters::long_adder::LongAdder;
    /// use stripe_adder::counters::Observable;
    ///
    /// let counter = LongAdder::new().with_name("connections");
    /// assert_eq!(counter.name(), "connections");
    /// ```
    pub const fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Caps the cell table at `stripes` cells instead of the available parallelism.
    ///
    /// The cap is rounded down to a power of two, and is never less than 2.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stripe_adder::counters::long_adder::LongAdder;
    ///
    /// let counter = LongAdder::new().with_max_stripes(12);
    /// assert_eq!(counter.max_stripes(), 8);
    /// ```
    pub const fn with_max_stripes(mut self, stripes: usize) -> Self {
        self.core.max_cells = stripe_cap(stripes);
        self
    }

    /// Adds `delta` to the counter.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stripe_adder::counters::long_adder::LongAdder;
    /// use stripe_adder::striped::probe::Probe;
    ///
    /// let counter = LongAdder::new();
    /// let mut probe = Probe::new();
    /// counter.add(&mut probe, 10);
    /// counter.add(&mut probe, -15);
    /// assert_eq!(counter.sum(), -5);
    /// ```
    #[inline]
    pub fn add(&self, probe: &mut Probe, delta: i64) {
        self.core.update(probe, delta, i64::wrapping_add);
    }

    /// Equivalent to `add(probe, 1)`.
    #[inline]
    pub fn increment(&self, probe: &mut Probe) {
        self.add(probe, 1);
    }

    /// Equivalent to `add(probe, -1)`.
    #[inline]
    pub fn decrement(&self, probe: &mut Probe) {
        self.add(probe, -1);
    }

    /// Returns the base plus every cell.
    ///
    /// Not a snapshot: with concurrent writers, some of their updates may be
    /// seen and others not.
    pub fn sum(&self) -> i64 {
        self.core.fold(i64::wrapping_add)
    }

    /// Sets the base and every cell to zero.
    ///
    /// Like [`sum`](Self::sum), this is not atomic across cells. Updates racing
    /// with `reset` may survive it.
    pub fn reset(&self) {
        self.core.reset();
    }

    /// Drains the base and every cell, returning what was drained.
    ///
    /// Each cell is swapped to zero atomically, so every update is counted by
    /// exactly one `sum_then_reset` call.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stripe_adder::counters::long_adder::LongAdder;
    /// use stripe_adder::striped::probe::Probe;
    ///
    /// let counter = LongAdder::new();
    /// let mut probe = Probe::new();
    /// counter.add(&mut probe, 42);
    /// assert_eq!(counter.sum_then_reset(), 42);
    /// assert_eq!(counter.sum(), 0);
    /// ```
    pub fn sum_then_reset(&self) -> i64 {
        self.core.fold_then_reset(i64::wrapping_add)
    }

    /// Number of cells currently in use, or 0 while the counter is unstriped.
    pub fn stripes(&self) -> usize {
        self.core.stripes()
    }

    /// The most cells this counter will ever grow to.
    pub fn max_stripes(&self) -> usize {
        self.core.cap()
    }
}

impl Observable for LongAdder {
    #[inline]
    fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    fn value(&self) -> i64 {
        self.sum()
    }

    #[inline]
    fn value_and_reset(&self) -> i64 {
        self.sum_then_reset()
    }
}

impl Default for LongAdder {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for LongAdder {
    /// Formats the counter showing the base and every non-zero cell.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_striped(f, self.name, &self.core)
    }
}
