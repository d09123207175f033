//! Wrapper types that change how a counter reacts to being observed.
//!
//! | Wrapper | Description |
//! |---------|-------------|
//! | [`Resettable`] | `value()` drains the counter, for per-period metrics |
//! | [`NonResettable`] | `value_and_reset()` leaves the counter alone, for running totals |
//!
//! Both wrappers implement [`Observable`](crate::counters::Observable) and
//! `Deref` to the wrapped counter, so writers keep calling `add`/`accumulate`
//! on them directly.
//!
//! # Examples
//!
//! ```rust
//! use stripe_adder::adapters::{NonResettable, Resettable};
//! use stripe_adder::counters::long_adder::LongAdder;
//! use stripe_adder::counters::Observable;
//! use stripe_adder::striped::probe::Probe;
//!
//! let per_period = Resettable::new(LongAdder::new().with_name("period_requests"));
//! let total = NonResettable::new(LongAdder::new().with_name("total_requests"));
//! let mut probe = Probe::new();
//!
//! per_period.add(&mut probe, 10);
//! total.add(&mut probe, 10);
//!
//! assert_eq!(per_period.value(), 10);
//! assert_eq!(per_period.value(), 0);
//! assert_eq!(total.value_and_reset(), 10);
//! assert_eq!(total.value(), 10);
//! ```

mod non_resettable;
mod resettable;

pub use non_resettable::NonResettable;
pub use resettable::Resettable;
