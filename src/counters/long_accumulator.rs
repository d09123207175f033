//! Striped accumulator for arbitrary combining functions.
//!
//! [`LongAccumulator`] generalizes [`LongAdder`](super::long_adder::LongAdder)
//! to any function `f(current, x)` that is associative and commutative and has
//! a neutral `identity`. The classic uses are maximum and minimum tracking:
//!
//! ```rust
//! use stripe_adder::counters::long_accumulator::LongAccumulator;
//! use stripe_adder::striped::probe::Probe;
//!
//! let max_latency = LongAccumulator::max().with_name("request_latency_max");
//! let mut probe = Probe::new();
//!
//! max_latency.accumulate(&mut probe, 150);
//! max_latency.accumulate(&mut probe, 85);
//! max_latency.accumulate(&mut probe, 200);
//!
//! assert_eq!(max_latency.get(), 200);
//! ```
//!
//! The function may be applied more than once per update under contention and
//! in any order across cells, so it must not have side effects.

use std::fmt::Debug;

use crate::counters::{fmt_striped, Observable};
use crate::striped::probe::Probe;
use crate::striped::{stripe_cap, StripedAdder};

/// Function pointer type used by [`LongAccumulator::max`] and [`LongAccumulator::min`].
pub type Combine = fn(i64, i64) -> i64;

/// A striped accumulator folding updates through `F`.
///
/// # Examples
///
/// A product accumulator:
///
/// ```rust
/// use stripe_adder::counters::long_accumulator::LongAccumulator;
/// use stripe_adder::striped::probe::Probe;
///
/// let product = LongAccumulator::new(i64::wrapping_mul, 1);
/// let mut probe = Probe::new();
/// product.accumulate(&mut probe, 3);
/// product.accumulate(&mut probe, 7);
/// assert_eq!(product.get(), 21);
/// ```
pub struct LongAccumulator<F = Combine> {
    name: &'static str,
    function: F,
    core: StripedAdder,
}

impl LongAccumulator<Combine> {
    /// Tracks the largest value observed. Starts at `i64::MIN`.
    pub const fn max() -> Self {
        Self::new(<i64 as Ord>::max as Combine, i64::MIN)
    }

    /// Tracks the smallest value observed. Starts at `i64::MAX`.
    pub const fn min() -> Self {
        Self::new(<i64 as Ord>::min as Combine, i64::MAX)
    }
}

impl<F> LongAccumulator<F>
where
    F: Fn(i64, i64) -> i64,
{
    /// Creates an accumulator for `function`, holding `identity`.
    ///
    /// `identity` must be neutral for `function`: `function(identity, x) == x`.
    pub const fn new(function: F, identity: i64) -> Self {
        LongAccumulator {
            name: "",
            function,
            core: StripedAdder::new(identity, 0),
        }
    }

    /// Sets the name of this accumulator, returning `self` for method chaining.
    pub const fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Caps the cell table at `stripes` cells, rounded down to a power of two.
    pub const fn with_max_stripes(mut self, stripes: usize) -> Self {
        self.core.max_cells = stripe_cap(stripes);
        self
    }

    /// Folds `x` into the accumulator.
    #[inline]
    pub fn accumulate(&self, probe: &mut Probe, x: i64) {
        self.core.update(probe, x, &self.function);
    }

    /// Returns the base folded with every cell.
    ///
    /// Not a snapshot under concurrent updates.
    pub fn get(&self) -> i64 {
        self.core.fold(&self.function)
    }

    /// Puts the identity back into the base and every cell.
    pub fn reset(&self) {
        self.core.reset();
    }

    /// Drains every cell back to the identity, returning the folded value.
    pub fn get_then_reset(&self) -> i64 {
        self.core.fold_then_reset(&self.function)
    }

    /// The neutral element this accumulator starts from.
    pub fn identity(&self) -> i64 {
        self.core.identity()
    }

    /// Number of cells currently in use, or 0 while unstriped.
    pub fn stripes(&self) -> usize {
        self.core.stripes()
    }

    /// The most cells this accumulator will ever grow to.
    pub fn max_stripes(&self) -> usize {
        self.core.cap()
    }
}

impl<F> Observable for LongAccumulator<F>
where
    F: Fn(i64, i64) -> i64,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn value(&self) -> i64 {
        self.get()
    }

    fn value_and_reset(&self) -> i64 {
        self.get_then_reset()
    }
}

impl Default for LongAccumulator<Combine> {
    /// Defaults to a maximum tracker.
    fn default() -> Self {
        Self::max()
    }
}

impl<F> Debug for LongAccumulator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_striped(f, self.name, &self.core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_max() {
        let tracker = LongAccumulator::max();
        let mut probe = Probe::new();
        assert_eq!(tracker.get(), i64::MIN);
        tracker.accumulate(&mut probe, 10);
        tracker.accumulate(&mut probe, -5);
        tracker.accumulate(&mut probe, 42);
        tracker.accumulate(&mut probe, 7);
        assert_eq!(tracker.get(), 42);
    }

    #[test]
    fn test_min() {
        let tracker = LongAccumulator::min();
        let mut probe = Probe::new();
        assert_eq!(tracker.get(), i64::MAX);
        tracker.accumulate(&mut probe, 10);
        tracker.accumulate(&mut probe, -5);
        tracker.accumulate(&mut probe, 3);
        assert_eq!(tracker.get(), -5);
    }

    #[test]
    fn test_custom_function() {
        let xor = LongAccumulator::new(|a: i64, b: i64| a ^ b, 0);
        let mut probe = Probe::new();
        xor.accumulate(&mut probe, 0b1010);
        xor.accumulate(&mut probe, 0b0110);
        assert_eq!(xor.get(), 0b1100);
        assert_eq!(xor.identity(), 0);
    }

    #[test]
    fn test_reset_restores_identity() {
        let tracker = LongAccumulator::max();
        let mut probe = Probe::new();
        tracker.accumulate(&mut probe, 99);
        tracker.reset();
        assert_eq!(tracker.get(), i64::MIN);
    }

    #[test]
    fn test_get_then_reset() {
        let tracker = LongAccumulator::min();
        let mut probe = Probe::new();
        tracker.accumulate(&mut probe, 4);
        tracker.accumulate(&mut probe, 2);
        assert_eq!(tracker.get_then_reset(), 2);
        assert_eq!(tracker.get(), i64::MAX);
    }

    #[test]
    fn test_unchanged_value_does_not_write() {
        let tracker = LongAccumulator::max();
        let mut probe = Probe::new();
        tracker.accumulate(&mut probe, 10);
        tracker.accumulate(&mut probe, 1);
        assert_eq!(tracker.get(), 10);
        assert_eq!(tracker.stripes(), 0);
    }

    #[test]
    fn test_multiple_threads_max() {
        let tracker = Arc::new(LongAccumulator::max().with_max_stripes(8));
        let handles: Vec<_> = (0..8i64)
            .map(|t| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    let mut probe = Probe::new();
                    for i in 0..10_000i64 {
                        tracker.accumulate(&mut probe, t * 10_000 + i);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.get(), 79_999);
    }

    #[test]
    fn test_multiple_threads_min_negative() {
        let tracker = Arc::new(LongAccumulator::min());
        let handles: Vec<_> = (1..=4i64)
            .map(|t| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    let mut probe = Probe::new();
                    for i in 0..10_000i64 {
                        tracker.accumulate(&mut probe, -(t * i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.get(), -39_996);
    }

    #[test]
    fn test_observable() {
        let tracker = LongAccumulator::max().with_name("peak");
        let mut probe = Probe::new();
        tracker.accumulate(&mut probe, 5);
        assert_eq!(tracker.name(), "peak");
        assert_eq!(tracker.value(), 5);
        assert_eq!(tracker.value_and_reset(), 5);
        assert_eq!(tracker.value(), i64::MIN);
    }

    #[test]
    fn test_debug() {
        let tracker = LongAccumulator::min().with_name("floor");
        let mut probe = Probe::new();
        tracker.accumulate(&mut probe, 3);
        assert_eq!(format!("{:?}", tracker), "floor{ base:3 }");
    }

    #[test]
    fn test_default_is_max() {
        let tracker = LongAccumulator::<Combine>::default();
        assert_eq!(tracker.identity(), i64::MIN);
    }
}
