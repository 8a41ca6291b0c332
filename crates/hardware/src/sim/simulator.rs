//! Simulator: feeds a trace through the memory hierarchy.
//!
//! References are processed strictly one at a time, each to completion. The
//! first bad line aborts the run and no report is produced.

use std::path::Path;

use tracing::info;

use super::loader;
use super::trace::TraceRecord;
use crate::common::{ConfigError, SimError};
use crate::config::HierarchyConfig;
use crate::core::hierarchy::{AccessOutcome, MemoryHierarchy};
use crate::stats::SimReport;

/// Top-level simulator: owns the hierarchy for one run.
#[derive(Debug, Clone)]
pub struct Simulator {
    hierarchy: MemoryHierarchy,
}

impl Simulator {
    /// Creates a simulator with cold caches.
    ///
    /// # Errors
    ///
    /// Any geometry error for either level.
    pub fn new(config: &HierarchyConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            hierarchy: MemoryHierarchy::new(config)?,
        })
    }

    /// Simulates a single reference.
    pub fn step(&mut self, record: TraceRecord) -> AccessOutcome {
        self.hierarchy
            .access(record.address, record.op.is_write())
    }

    /// Runs every reference in `trace` and returns the final statistics.
    ///
    /// # Errors
    ///
    /// The first error yielded by `trace`. Nothing is reported for a run that
    /// fails part-way.
    pub fn run<I>(&mut self, trace: I) -> Result<SimReport, SimError>
    where
        I: IntoIterator<Item = Result<TraceRecord, SimError>>,
    {
        info!(
            l1 = ?self.hierarchy.l1().geometry(),
            l2 = ?self.hierarchy.l2().geometry(),
            policy = ?self.hierarchy.policy(),
            "starting run"
        );
        for record in trace {
            let _ = self.step(record?);
        }
        let report = self.report();
        info!(
            references = report.references,
            total_cycles = report.total_cycles,
            "run complete"
        );
        Ok(report)
    }

    /// Opens `path` and runs it through a fresh simulator.
    ///
    /// # Errors
    ///
    /// Configuration, I/O, or trace format errors.
    pub fn run_file(config: &HierarchyConfig, path: impl AsRef<Path>) -> Result<SimReport, SimError> {
        let trace = loader::open_trace(path)?;
        Self::new(config)?.run(trace)
    }

    /// Statistics so far.
    pub fn report(&self) -> SimReport {
        self.hierarchy.report()
    }

    /// The underlying hierarchy.
    pub const fn hierarchy(&self) -> &MemoryHierarchy {
        &self.hierarchy
    }
}
