//! Observers for exporting counter values.
//!
//! - [`table`] - Pretty-print counters as tables using the `tabled` crate
//! - [`json`] - Serialize counters to JSON
//!
//! Every observer takes an iterator of `&dyn Observable`, so adders,
//! accumulators and adapters can be mixed freely.
//!
//! # Unified Error Handling
//!
//! All observers report failures through [`ObserverError`].
//!
//! # Feature Flags
//!
//! - `table` - Enables the [`table`] module
//! - `json` - Enables the [`json`] module (and `serde`)
//! - `full` - Enables all observer modules

mod error;

pub use error::{ObserverError, Result};

#[cfg(feature = "table")]
pub mod table;

#[cfg(feature = "json")]
pub mod json;
