//! Wrapper for running totals that must survive reset sweeps.

use crate::counters::Observable;
use std::fmt::{self, Debug};
use std::ops::Deref;

/// A wrapper whose `value_and_reset()` reports the value without resetting.
///
/// Use it for all-time totals that sit in the same collection as per-period
/// counters: an observer calling `collect_and_reset` will drain the others
/// and leave this one accumulating.
///
/// # Example
///
/// ```rust
/// use stripe_adder::adapters::NonResettable;
/// use stripe_adder::counters::long_adder::LongAdder;
/// use stripe_adder::counters::Observable;
/// use stripe_adder::striped::probe::Probe;
///
/// let total = NonResettable::new(LongAdder::new().with_name("total_events"));
/// let mut probe = Probe::new();
/// total.add(&mut probe, 100);
///
/// assert_eq!(total.value_and_reset(), 100);
/// assert_eq!(total.value(), 100);
/// ```
pub struct NonResettable<T> {
    inner: T,
}

impl<T> NonResettable<T> {
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

impl<T: Observable> Observable for NonResettable<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn value(&self) -> i64 {
        self.inner.value()
    }

    /// Returns the current value. The inner counter is left untouched.
    fn value_and_reset(&self) -> i64 {
        self.inner.value()
    }
}

impl<T: Debug> Debug for NonResettable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonResettable")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<T> Deref for NonResettable<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
