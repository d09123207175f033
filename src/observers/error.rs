//! Unified error type for all observers.
//!
//! Counters themselves never fail. Only exporting their values can, and every
//! observer reports those failures through [`ObserverError`].

use thiserror::Error;

/// Error returned by observer operations.
#[derive(Debug, Error)]
pub enum ObserverError {
    /// Serialization failed in the JSON observer.
    #[cfg(feature = "json")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing rendered output to a sink failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for observer operations.
pub type Result<T> = std::result::Result<T, ObserverError>;
