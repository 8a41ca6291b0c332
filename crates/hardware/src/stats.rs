//! Simulation statistics collection and reporting.
//!
//! This module turns the raw counters of a finished run into the reported
//! metrics. It provides:
//! 1. **Per-level counters:** Accesses, hits and misses for L1 and L2.
//! 2. **Derived metrics:** Miss rate per level and average access time per reference.
//! 3. **Output:** The one-line summary (`Display`) and a JSON-serializable form.
//!
//! Every ratio is defined as 0.0 when its denominator is zero, so an empty
//! trace reports `L1miss=0.000 L2miss=0.000 AccTimeAvg=0.000`.

use std::fmt;

use serde::Serialize;

use crate::common::Level;
use crate::core::cache::Cache;

/// Divides, returning 0.0 for an empty denominator.
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Counters for one cache level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelReport {
    /// Which level these counters belong to.
    pub level: Level,
    /// Lookups made through `access`.
    pub accesses: u64,
    /// Lookups that missed.
    pub misses: u64,
}

impl LevelReport {
    /// Snapshots the counters of `cache`.
    pub const fn from_cache(cache: &Cache) -> Self {
        Self {
            level: cache.level(),
            accesses: cache.total_accesses(),
            misses: cache.misses(),
        }
    }

    /// Lookups that hit.
    pub const fn hits(&self) -> u64 {
        self.accesses - self.misses
    }

    /// `misses / accesses`, or 0.0 if the level was never accessed.
    pub fn miss_rate(&self) -> f64 {
        ratio(self.misses, self.accesses)
    }
}

/// Final statistics of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimReport {
    /// L1 counters.
    pub l1: LevelReport,
    /// L2 counters.
    pub l2: LevelReport,
    /// Number of trace references simulated.
    pub references: u64,
    /// Total cycles charged across all references.
    pub total_cycles: u64,
    /// L1 miss rate.
    pub l1_miss_rate: f64,
    /// L2 miss rate.
    pub l2_miss_rate: f64,
    /// Average cycles per reference.
    pub avg_access_time: f64,
}

impl SimReport {
    /// Builds a report from both levels and the accumulated latency.
    pub fn new(l1: &Cache, l2: &Cache, references: u64, total_cycles: u64) -> Self {
        let l1 = LevelReport::from_cache(l1);
        let l2 = LevelReport::from_cache(l2);
        Self {
            l1,
            l2,
            references,
            total_cycles,
            l1_miss_rate: l1.miss_rate(),
            l2_miss_rate: l2.miss_rate(),
            avg_access_time: ratio(total_cycles, references),
        }
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` failures (none are expected for this type).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SimReport {
    /// Formats the report as `L1miss=<r> L2miss=<r> AccTimeAvg=<t>`, three decimals each.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "L1miss={:.3} L2miss={:.3} AccTimeAvg={:.3}",
            self.l1_miss_rate, self.l2_miss_rate, self.avg_access_time
        )
    }
}
