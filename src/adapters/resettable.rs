//! Wrapper that drains a counter every time it is read.

use crate::counters::Observable;
use std::fmt::{self, Debug};
use std::ops::Deref;

/// A wrapper whose `value()` returns the current value *and* resets the counter.
///
/// Handy for observers that sample periodically: each sample reports what
/// happened since the previous one. The drain goes through
/// [`Observable::value_and_reset`], so on a striped counter every update is
/// reported by exactly one sample.
///
/// # Example
///
/// ```rust
/// use stripe_adder::adapters::Resettable;
/// use stripe_adder::counters::long_adder::LongAdder;
/// use stripe_adder::counters::Observable;
/// use stripe_adder::striped::probe::Probe;
///
/// let requests = Resettable::new(LongAdder::new().with_name("requests"));
/// let mut probe = Probe::new();
/// requests.add(&mut probe, 50);
/// requests.add(&mut probe, 50);
///
/// assert_eq!(requests.value(), 100);
/// assert_eq!(requests.value(), 0);
/// ```
pub struct Resettable<T> {
    inner: T,
}

impl<T> Resettable<T> {
    /// Wraps `inner`.
    pub const fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Returns a reference to the inner counter.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consumes the wrapper and returns the inner counter.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Observable> Observable for Resettable<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    /// Returns the current value and resets the inner counter.
    fn value(&self) -> i64 {
        self.inner.value_and_reset()
    }

    fn value_and_reset(&self) -> i64 {
        self.inner.value_and_reset()
    }
}

impl<T: Debug> Debug for Resettable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resettable")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<T> Deref for Resettable<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::long_accumulator::LongAccumulator;
    use crate::counters::long_adder::LongAdder;
    use crate::striped::probe::Probe;

    #[test]
    fn test_name() {
        let counter = Resettable::new(LongAdder::new().with_name("test"));
        assert_eq!(counter.name(), "test");
    }

    #[test]
    fn test_value_resets() {
        let counter = Resettable::new(LongAdder::new());
        let mut probe = Probe::new();
        counter.add(&mut probe, 42);

        assert_eq!(counter.value(), 42);
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_accumulates_after_reset() {
        let counter = Resettable::new(LongAdder::new());
        let mut probe = Probe::new();
        counter.add(&mut probe, 100);
        let _ = counter.value();

        counter.add(&mut probe, 50);
        assert_eq!(counter.value(), 50);
    }

    #[test]
    fn test_with_accumulator() {
        let peak = Resettable::new(LongAccumulator::max().with_name("peak"));
        let mut probe = Probe::new();
        peak.accumulate(&mut probe, 12);
        peak.accumulate(&mut probe, 30);

        assert_eq!(peak.value(), 30);
        assert_eq!(peak.value(), i64::MIN);
    }

    #[test]
    fn test_deref_does_not_reset() {
        let counter = Resettable::new(LongAdder::new());
        let mut probe = Probe::new();
        counter.add(&mut probe, 10);
        // Going through the inner counter reads without draining
        assert_eq!(counter.sum(), 10);
        assert_eq!(counter.inner().sum(), 10);
        assert_eq!(counter.value(), 10);
    }

    #[test]
    fn test_into_inner() {
        let counter = Resettable::new(LongAdder::new().with_name("consume"));
        let mut probe = Probe::new();
        counter.add(&mut probe, 100);

        let inner = counter.into_inner();
        assert_eq!(inner.name(), "consume");
        assert_eq!(inner.sum(), 100);
    }

    #[test]
    fn test_debug() {
        let counter = Resettable::new(LongAdder::new().with_name("debug_test"));
        let debug_str = format!("{:?}", counter);
        assert!(debug_str.contains("Resettable"));
        assert!(debug_str.contains("debug_test"));
    }
}
