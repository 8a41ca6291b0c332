//! Two-level cache hierarchy latency model.
//!
//! This crate estimates miss rates and average access time for an L1/L2
//! hierarchy driven by a memory reference trace:
//! 1. **Core:** Set-associative caches with LRU replacement and the inclusive,
//!    write-back L1/L2 protocol.
//! 2. **Configuration:** Log2-encoded run parameters, validation and derived geometry.
//! 3. **Simulation:** Trace parsing, file loading and the run loop.
//! 4. **Statistics:** Miss rates, average access time and report formatting.

/// Error types and the cache level tag.
pub mod common;
/// Run parameters and hierarchy configuration.
pub mod config;
/// Caches and the hierarchy controller.
pub mod core;
/// Trace input and the run loop.
pub mod sim;
/// Statistics and report output.
pub mod stats;

/// Root configuration type; build with `HierarchyConfig::default()` or `SimParams::into_config`.
pub use crate::config::HierarchyConfig;
/// L1 + L2 + memory.
pub use crate::core::MemoryHierarchy;
/// Trace-driven run loop.
pub use crate::sim::Simulator;
/// Final statistics.
pub use crate::stats::SimReport;
