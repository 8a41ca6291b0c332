//! Common types shared by every part of the model.
//!
//! Currently this is the error vocabulary: configuration, trace-format and
//! run-level failures, plus the [`Level`] tag used to name a cache in
//! diagnostics and reports.

/// Error types for configuration, trace parsing and simulation runs.
pub mod error;

pub use error::{ConfigError, Level, SimError, TraceError};
