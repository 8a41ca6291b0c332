//! Two-Level Memory Hierarchy.
//!
//! Runs the per-reference protocol between an L1, an L2 and main memory and
//! accumulates the latency charged to each reference. The protocol is:
//! 1. **L1 lookup:** Always charged. A hit ends the reference.
//! 2. **No-allocate write miss:** L2 is charged and its copy (if any) is marked
//!    dirty; memory is charged if L2 does not hold the block. Nothing is filled.
//! 3. **Fetch:** L2 is accessed as a read. On a hit the block is filled into L1.
//!    On a miss memory is charged, the block is filled into L2 (clean), any
//!    valid L2 victim is snooped out of L1, and the block is filled into L1.
//!
//! Whenever an L1 fill displaces a dirty block, the L2 copy of that block is
//! marked dirty. Dirty blocks leaving L2 are dropped; memory write-back is not
//! timed. Cycle sums saturate at `u64::MAX`.

use tracing::{debug, trace};

use super::cache::Cache;
use crate::common::{ConfigError, Level};
use crate::config::{HierarchyConfig, HierarchyPolicy, InclusionPolicy};
use crate::stats::SimReport;

/// Where the data for a reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServedBy {
    /// L1 hit.
    L1,
    /// L1 miss, L2 hit (or a no-allocate write absorbed by L2).
    L2,
    /// Missed both levels.
    Memory,
}

/// Result of simulating one reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessOutcome {
    /// Cycles charged to this reference.
    pub cycles: u64,
    /// Level that satisfied it.
    pub served_by: ServedBy,
}

/// L1 + L2 + memory, with the latency accumulated so far.
#[derive(Debug, Clone)]
pub struct MemoryHierarchy {
    l1: Cache,
    l2: Cache,
    memory_latency: u64,
    policy: HierarchyPolicy,
    total_cycles: u64,
    references: u64,
}

impl MemoryHierarchy {
    /// Builds both levels from a validated configuration.
    ///
    /// # Errors
    ///
    /// Any geometry error for either level.
    pub fn new(config: &HierarchyConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            l1: Cache::new(Level::L1, &config.l1, config.block_bytes)?,
            l2: Cache::new(Level::L2, &config.l2, config.block_bytes)?,
            memory_latency: config.memory_latency,
            policy: config.policy,
            total_cycles: 0,
            references: 0,
        })
    }

    /// Simulates one CPU reference to completion.
    pub fn access(&mut self, addr: u64, is_write: bool) -> AccessOutcome {
        self.references += 1;
        let mut cycles = self.l1.latency();

        let served_by = if self.l1.access(addr, is_write) {
            ServedBy::L1
        } else if is_write && !self.policy.write_allocate() {
            cycles = cycles.saturating_add(self.l2.latency());
            if self.l2.update_dirty_block(addr) {
                ServedBy::L2
            } else {
                cycles = cycles.saturating_add(self.memory_latency);
                ServedBy::Memory
            }
        } else {
            cycles = cycles.saturating_add(self.l2.latency());
            if self.l2.access(addr, false) {
                self.fill_l1(addr, is_write);
                ServedBy::L2
            } else {
                cycles = cycles.saturating_add(self.memory_latency);
                self.fill_l2(addr);
                self.fill_l1(addr, is_write);
                ServedBy::Memory
            }
        };

        self.total_cycles = self.total_cycles.saturating_add(cycles);
        debug!(
            addr = format_args!("{addr:#x}"),
            write = is_write,
            ?served_by,
            cycles,
            "reference"
        );
        AccessOutcome { cycles, served_by }
    }

    /// Fills L2 from memory, snooping its victim out of L1 when inclusive.
    fn fill_l2(&mut self, addr: u64) {
        let Some(victim) = self.l2.insert_block(addr, false).evicted_address() else {
            return;
        };
        if self.policy.inclusion == InclusionPolicy::Inclusive {
            self.l1.snoop(victim);
        }
    }

    /// Fills L1 and pushes a dirty victim's dirty bit down into L2.
    fn fill_l1(&mut self, addr: u64, is_write: bool) {
        if let Some(victim) = self.l1.insert_block(addr, is_write).dirty_victim() {
            let found = self.l2.update_dirty_block(victim);
            trace!(
                victim = format_args!("{victim:#x}"),
                found,
                "L1 write-back"
            );
        }
    }

    /// Snapshot of the counters and accumulated latency.
    pub fn report(&self) -> SimReport {
        SimReport::new(&self.l1, &self.l2, self.references, self.total_cycles)
    }

    /// First-level cache.
    pub const fn l1(&self) -> &Cache {
        &self.l1
    }

    /// Second-level cache.
    pub const fn l2(&self) -> &Cache {
        &self.l2
    }

    /// Active policy.
    pub const fn policy(&self) -> &HierarchyPolicy {
        &self.policy
    }

    /// Main memory latency in cycles.
    pub const fn memory_latency(&self) -> u64 {
        self.memory_latency
    }

    /// Sum of the cycles charged to every reference so far.
    pub const fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Number of references simulated so far.
    pub const fn references(&self) -> u64 {
        self.references
    }
}
