//! Public counter types and the shared [`Observable`] interface.
//!
//! Both counters here sit on top of [`StripedAdder`](crate::striped::StripedAdder):
//!
//! | Type | Combining function | Use Case |
//! |------|--------------------|----------|
//! | [`LongAdder`](long_adder::LongAdder) | wrapping `+` | Event counts, gauges, byte totals |
//! | [`LongAccumulator`](long_accumulator::LongAccumulator) | any associative, commutative `f` | Maximum/minimum tracking, custom folds |
//!
//! Writers pass their own [`Probe`](crate::striped::probe::Probe) on every
//! update. Readers don't need one.

pub mod long_accumulator;
pub mod long_adder;

use std::fmt::{Debug, Display};

/// A trait for counters that can be read by name, independently of their type.
///
/// Observers and adapters work on `&dyn Observable`, so any counter in this
/// crate can be exported the same way.
///
/// # Examples
///
/// ```rust
/// use stripe_adder::counters::Observable;
/// use stripe_adder::counters::long_adder::LongAdder;
/// use stripe_adder::striped::probe::Probe;
///
/// let counter = LongAdder::new().with_name("requests");
/// let mut probe = Probe::new();
/// counter.add(&mut probe, 5);
///
/// assert_eq!(counter.name(), "requests");
/// assert_eq!(counter.value(), 5);
/// assert_eq!(counter.value_and_reset(), 5);
/// assert_eq!(counter.value(), 0);
/// ```
pub trait Observable: Debug {
    /// Returns the name of this counter, or an empty string if unnamed.
    fn name(&self) -> &str;

    /// Returns the current aggregated value.
    ///
    /// Cells are read one at a time, so concurrent writers may be partially
    /// included.
    fn value(&self) -> i64;

    /// Returns the current value and resets the counter.
    ///
    /// Every cell is drained with an atomic swap: an update lands either in the
    /// returned value or in the next one, never in both.
    fn value_and_reset(&self) -> i64;
}

impl Display for dyn Observable + '_ {
    /// Formats the counter as `name:value` if named, or just `value` otherwise.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.name().is_empty() {
            write!(f, "{}:{}", self.name(), self.value())
        } else {
            write!(f, "{}", self.value())
        }
    }
}

/// Writes `name{ base:b [i]:v ... }`, skipping cells equal to `identity`.
pub(crate) fn fmt_striped(
    f: &mut std::fmt::Formatter<'_>,
    name: &str,
    core: &crate::striped::StripedAdder,
) -> std::fmt::Result {
    write!(f, "{}{{ base:{}", name, core.base())?;
    let identity = core.identity();
    let mut result = Ok(());
    core.for_each_cell(|i, val| {
        if result.is_ok() && val != identity {
            result = write!(f, " [{i}]:{val}");
        }
    });
    result?;
    write!(f, " }}")
}
