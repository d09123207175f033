//! Serializable point-in-time captures of counter values.
//!
//! # Feature Flag
//!
//! This module requires the `serde` feature:
//!
//! ```toml
//! [dependencies]
//! stripe-adder = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use stripe_adder::counters::long_adder::LongAdder;
//! use stripe_adder::counters::Observable;
//! use stripe_adder::snapshot::MetricsSnapshot;
//! use stripe_adder::striped::probe::Probe;
//!
//! let requests = LongAdder::new().with_name("requests");
//! let errors = LongAdder::new().with_name("errors");
//! let mut probe = Probe::new();
//! requests.add(&mut probe, 42);
//!
//! let counters: Vec<&dyn Observable> = vec![&requests, &errors];
//! let snapshot = MetricsSnapshot::collect(counters.into_iter());
//! assert_eq!(snapshot.get("requests").map(|c| c.value), Some(42));
//! ```

use crate::counters::Observable;
use serde::{Deserialize, Serialize};

/// Name used for counters that were never given one.
pub const UNNAMED: &str = "(unnamed)";

/// A snapshot of a single counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// The name of the counter.
    pub name: String,
    /// The value of the counter when the snapshot was taken.
    pub value: i64,
}

impl CounterSnapshot {
    /// Creates a new counter snapshot.
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Reads `counter` without resetting it.
    pub fn from_observable(counter: &dyn Observable) -> Self {
        Self::new(display_name(counter), counter.value())
    }

    /// Reads and resets `counter`.
    pub fn from_observable_and_reset(counter: &dyn Observable) -> Self {
        Self::new(display_name(counter), counter.value_and_reset())
    }
}

fn display_name(counter: &dyn Observable) -> &str {
    if counter.name().is_empty() {
        UNNAMED
    } else {
        counter.name()
    }
}

/// A collection of counter snapshots, optionally timestamped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Optional timestamp in milliseconds since Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp_ms: Option<u64>,
    /// The counter snapshots.
    pub counters: Vec<CounterSnapshot>,
}

impl MetricsSnapshot {
    /// Creates a new metrics snapshot with the given counters.
    pub fn new(counters: Vec<CounterSnapshot>) -> Self {
        Self {
            timestamp_ms: None,
            counters,
        }
    }

    /// Creates a new metrics snapshot with counters and a timestamp.
    pub fn with_timestamp(counters: Vec<CounterSnapshot>, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            counters,
        }
    }

    /// Finds a counter by name.
    pub fn get(&self, name: &str) -> Option<&CounterSnapshot> {
        self.counters.iter().find(|c| c.name == name)
    }

    /// Sum of every captured value, wrapping on overflow.
    pub fn total(&self) -> i64 {
        self.counters
            .iter()
            .fold(0i64, |acc, c| acc.wrapping_add(c.value))
    }

    /// Collects snapshots from an iterator of observable counters.
    pub fn collect<'a>(counters: impl Iterator<Item = &'a dyn Observable>) -> Self {
        Self::new(counters.map(CounterSnapshot::from_observable).collect())
    }

    /// Collects snapshots and resets every counter.
    pub fn collect_and_reset<'a>(counters: impl Iterator<Item = &'a dyn Observable>) -> Self {
        Self::new(
            counters
                .map(CounterSnapshot::from_observable_and_reset)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::NonResettable;
    use crate::counters::long_accumulator::LongAccumulator;
    use crate::counters::long_adder::LongAdder;
    use crate::striped::probe::Probe;

    #[test]
    fn test_counter_snapshot_from_observable() {
        let counter = LongAdder::new().with_name("requests");
        let mut probe = Probe::new();
        counter.add(&mut probe, 100);

        let snapshot = CounterSnapshot::from_observable(&counter);
        assert_eq!(snapshot, CounterSnapshot::new("requests", 100));
        assert_eq!(counter.sum(), 100);
    }

    #[test]
    fn test_counter_snapshot_unnamed() {
        let counter = LongAdder::new();
        let snapshot = CounterSnapshot::from_observable(&counter);
        assert_eq!(snapshot.name, UNNAMED);
    }

    #[test]
    fn test_counter_snapshot_from_observable_and_reset() {
        let counter = LongAdder::new().with_name("drained");
        let mut probe = Probe::new();
        counter.add(&mut probe, 75);

        let snapshot = CounterSnapshot::from_observable_and_reset(&counter);
        assert_eq!(snapshot.value, 75);
        assert_eq!(counter.sum(), 0);
    }

    #[test]
    fn test_metrics_snapshot_collect_and_reset() {
        let period = LongAdder::new().with_name("period");
        let total = NonResettable::new(LongAdder::new().with_name("total"));
        let peak = LongAccumulator::max().with_name("peak");
        let mut probe = Probe::new();
        period.add(&mut probe, 3);
        total.add(&mut probe, 4);
        peak.accumulate(&mut probe, 9);

        let counters: Vec<&dyn Observable> = vec![&period, &total, &peak];
        let snapshot = MetricsSnapshot::collect_and_reset(counters.into_iter());

        assert_eq!(snapshot.get("period").map(|c| c.value), Some(3));
        assert_eq!(snapshot.get("total").map(|c| c.value), Some(4));
        assert_eq!(snapshot.get("peak").map(|c| c.value), Some(9));
        assert!(snapshot.get("missing").is_none());
        assert_eq!(period.sum(), 0);
        assert_eq!(total.sum(), 4);
        assert_eq!(peak.get(), i64::MIN);
    }

    #[test]
    fn test_metrics_snapshot_total() {
        let snapshot = MetricsSnapshot::new(vec![
            CounterSnapshot::new("a", 1),
            CounterSnapshot::new("b", -3),
        ]);
        assert_eq!(snapshot.total(), -2);
        assert!(snapshot.timestamp_ms.is_none());
    }

    #[test]
    fn test_serialize_metrics_snapshot() {
        let snapshot =
            MetricsSnapshot::with_timestamp(vec![CounterSnapshot::new("a", -1)], 1234567890);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"{"timestamp_ms":1234567890,"counters":[{"name":"a","value":-1}]}"#
        );
    }

    #[test]
    fn test_deserialize_without_timestamp() {
        let json = r#"{"counters":[{"name":"a","value":1}]}"#;
        let snapshot: MetricsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.timestamp_ms, None);
        assert_eq!(snapshot.counters, vec![CounterSnapshot::new("a", 1)]);
    }
}
