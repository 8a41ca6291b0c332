//! Cache model core.
//!
//! This module contains the single-level cache (sets, LRU discipline, address
//! decoding) and the two-level hierarchy controller that coordinates L1, L2
//! and main memory for each reference.

/// Set-associative cache level with LRU replacement.
pub mod cache;

/// L1/L2/memory reference protocol and latency accounting.
pub mod hierarchy;

pub use self::cache::{Cache, Eviction};
pub use self::hierarchy::{AccessOutcome, MemoryHierarchy, ServedBy};
