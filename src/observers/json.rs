//! JSON observer for serializing counters.
//!
//! [`JsonObserver`] turns a collection of [`Observable`] counters into JSON,
//! either as a bare array of [`CounterSnapshot`]s or wrapped in a
//! [`MetricsSnapshot`] with an optional timestamp.
//!
//! # Feature Flag
//!
//! This module requires the `json` feature.
//!
//! # Examples
//!
//! ```rust
//! use stripe_adder::counters::long_adder::LongAdder;
//! use stripe_adder::counters::Observable;
//! use stripe_adder::observers::json::JsonObserver;
//! use stripe_adder::striped::probe::Probe;
//!
//! let requests = LongAdder::new().with_name("http_requests");
//! let mut probe = Probe::new();
//! requests.add(&mut probe, 1000);
//!
//! let counters: Vec<&dyn Observable> = vec![&requests];
//! let json = JsonObserver::new().to_json(counters.into_iter()).unwrap();
//! assert_eq!(json, r#"[{"name":"http_requests","value":1000}]"#);
//! ```

use std::io::Write;

use crate::counters::Observable;
use crate::observers::Result;
use crate::snapshot::{CounterSnapshot, MetricsSnapshot};
use serde::Serialize;

/// Configuration for the JSON observer.
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Whether to pretty-print the JSON output.
    pub pretty: bool,
    /// Whether to include a timestamp in the output.
    pub include_timestamp: bool,
    /// Whether to wrap counters in a [`MetricsSnapshot`] object.
    pub wrap_in_snapshot: bool,
}

/// An observer that serializes counters to JSON.
///
/// ```rust
/// use stripe_adder::observers::json::JsonObserver;
///
/// let observer = JsonObserver::new()
///     .pretty(true)
///     .wrap_in_snapshot(true)
///     .include_timestamp(true);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonObserver {
    config: JsonConfig,
}

impl JsonObserver {
    /// Creates a new JSON observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new JSON observer with the specified configuration.
    pub fn with_config(config: JsonConfig) -> Self {
        Self { config }
    }

    /// Enables or disables pretty-printing.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.config.pretty = enabled;
        self
    }

    /// Enables or disables timestamp inclusion.
    ///
    /// Only has effect when `wrap_in_snapshot` is also enabled.
    pub fn include_timestamp(mut self, enabled: bool) -> Self {
        self.config.include_timestamp = enabled;
        self
    }

    /// Enables or disables wrapping the output in a [`MetricsSnapshot`].
    pub fn wrap_in_snapshot(mut self, enabled: bool) -> Self {
        self.config.wrap_in_snapshot = enabled;
        self
    }

    /// Serializes counters to a JSON string.
    pub fn to_json<'a>(&self, counters: impl Iterator<Item = &'a dyn Observable>) -> Result<String> {
        let snapshots = counters.map(CounterSnapshot::from_observable).collect();
        self.serialize(snapshots)
    }

    /// Serializes counters to a JSON string, resetting each of them.
    pub fn to_json_and_reset<'a>(
        &self,
        counters: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<String> {
        let snapshots = counters
            .map(CounterSnapshot::from_observable_and_reset)
            .collect();
        self.serialize(snapshots)
    }

    /// Serializes counters as JSON straight into `writer`.
    pub fn write_to<'a, W: Write>(
        &self,
        mut writer: W,
        counters: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<()> {
        let json = self.to_json(counters)?;
        writer.write_all(json.as_bytes())?;
        Ok(())
    }

    fn serialize(&self, snapshots: Vec<CounterSnapshot>) -> Result<String> {
        if self.config.wrap_in_snapshot {
            let snapshot = if self.config.include_timestamp {
                MetricsSnapshot::with_timestamp(snapshots, current_timestamp_ms())
            } else {
                MetricsSnapshot::new(snapshots)
            };
            self.encode(&snapshot)
        } else {
            self.encode(&snapshots)
        }
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}

/// Returns the current timestamp in milliseconds since Unix epoch.
fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::long_accumulator::LongAccumulator;
    use crate::counters::long_adder::LongAdder;
    use crate::observers::ObserverError;
    use crate::striped::probe::Probe;

    #[test]
    fn test_to_json_empty() {
        let counters: Vec<&dyn Observable> = vec![];
        let json = JsonObserver::new().to_json(counters.into_iter()).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn test_to_json_multiple_counters() {
        let requests = LongAdder::new().with_name("requests");
        let balance = LongAdder::new().with_name("balance");
        let mut probe = Probe::new();
        requests.add(&mut probe, 1000);
        balance.add(&mut probe, -5);

        let counters: Vec<&dyn Observable> = vec![&requests, &balance];
        let json = JsonObserver::new().to_json(counters.into_iter()).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"requests","value":1000},{"name":"balance","value":-5}]"#
        );
    }

    #[test]
    fn test_to_json_wrapped() {
        let peak = LongAccumulator::max().with_name("peak");
        let mut probe = Probe::new();
        peak.accumulate(&mut probe, 17);

        let counters: Vec<&dyn Observable> = vec![&peak];
        let json = JsonObserver::new()
            .wrap_in_snapshot(true)
            .to_json(counters.into_iter())
            .unwrap();
        assert_eq!(json, r#"{"counters":[{"name":"peak","value":17}]}"#);
    }

    #[test]
    fn test_to_json_with_timestamp() {
        let counter = LongAdder::new().with_name("c");
        let counters: Vec<&dyn Observable> = vec![&counter];
        let json = JsonObserver::new()
            .wrap_in_snapshot(true)
            .include_timestamp(true)
            .to_json(counters.into_iter())
            .unwrap();

        let snapshot: MetricsSnapshot = serde_json::from_str(&json).unwrap();
        assert!(snapshot.timestamp_ms.is_some());
        assert_eq!(snapshot.counters.len(), 1);
    }

    #[test]
    fn test_pretty() {
        let counter = LongAdder::new().with_name("c");
        let counters: Vec<&dyn Observable> = vec![&counter];
        let json = JsonObserver::with_config(JsonConfig {
            pretty: true,
            ..JsonConfig::default()
        })
        .to_json(counters.into_iter())
        .unwrap();
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_and_reset() {
        let counter = LongAdder::new().with_name("period");
        let mut probe = Probe::new();
        counter.add(&mut probe, 8);

        let counters: Vec<&dyn Observable> = vec![&counter];
        let json = JsonObserver::new()
            .to_json_and_reset(counters.into_iter())
            .unwrap();
        assert!(json.contains("8"));
        assert_eq!(counter.sum(), 0);
    }

    #[test]
    fn test_write_to() {
        let counter = LongAdder::new().with_name("w");
        let counters: Vec<&dyn Observable> = vec![&counter];
        let mut out = Vec::new();
        JsonObserver::new()
            .write_to(&mut out, counters.into_iter())
            .unwrap();
        assert_eq!(out, br#"[{"name":"w","value":0}]"#);
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_to_reports_io_error() {
        let counter = LongAdder::new();
        let counters: Vec<&dyn Observable> = vec![&counter];
        let err = JsonObserver::new()
            .write_to(Closed, counters.into_iter())
            .unwrap_err();
        assert!(matches!(err, ObserverError::Io(_)));
    }
}
