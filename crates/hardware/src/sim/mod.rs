//! Simulation driver and trace input.
//!
//! Provides the trace parser, file loading, and the [`Simulator`] that runs a
//! trace through the hierarchy.

/// Trace and parameter file loading.
pub mod loader;
/// The run loop.
pub mod simulator;
/// Trace line parsing.
pub mod trace;

pub use simulator::Simulator;
pub use trace::{TraceOp, TraceReader, TraceRecord};
