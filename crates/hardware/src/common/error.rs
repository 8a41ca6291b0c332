//! Error definitions.
//!
//! This module defines every failure the model can report. It provides:
//! 1. **Configuration errors:** Bad parameter values and impossible cache geometries.
//! 2. **Trace errors:** Lines that do not parse into an operation and an address.
//! 3. **Simulation errors:** The top-level error returned by a run, wrapping the above plus I/O.
//!
//! All errors are fatal: a run that hits one produces no statistics.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Cache level identifier used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Level {
    /// First-level cache, accessed by every reference.
    L1,
    /// Second-level cache, backing L1.
    L2,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
        }
    }
}

/// Invalid or incomplete hierarchy configuration.
///
/// Raised before any reference is simulated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required parameter was never supplied.
    #[error("missing required parameter --{0}")]
    MissingParameter(&'static str),

    /// A log2 parameter is too large to exponentiate into a 64-bit quantity.
    #[error("parameter --{name} = {value} is out of range (log2 exponent must be below 64)")]
    ExponentOutOfRange {
        /// Parameter name as spelled on the command line.
        name: &'static str,
        /// The rejected exponent.
        value: u32,
    },

    /// `wr-alloc` was neither 0 nor 1.
    #[error("parameter --wr-alloc must be 0 or 1, got {0}")]
    InvalidWriteAllocate(u32),

    /// Block size, way count, or capacity was zero.
    #[error("{level}: {what} must be non-zero")]
    ZeroSized {
        /// The offending level.
        level: Level,
        /// Which quantity was zero.
        what: &'static str,
    },

    /// `ways * block_bytes` does not divide the capacity into a whole number of sets.
    #[error(
        "{level}: {size_bytes} bytes cannot be split into sets of {ways} way(s) x {block_bytes} byte blocks"
    )]
    UnevenGeometry {
        /// The offending level.
        level: Level,
        /// Total capacity in bytes.
        size_bytes: u64,
        /// Associativity.
        ways: u64,
        /// Block size in bytes.
        block_bytes: u64,
    },

    /// The parameter file could not be decoded.
    #[error("malformed parameter file: {0}")]
    Malformed(String),
}

/// A trace line that does not describe a memory reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// The line is empty or holds only whitespace.
    #[error("expected `<op> <addr>`, found an empty line")]
    EmptyLine,

    /// The line has an operation but no address token.
    #[error("expected `<op> <addr>`, found {0:?}")]
    MissingAddress(String),

    /// The operation token is not `R` or `W`.
    #[error("unknown operation {0:?} (expected R or W)")]
    UnknownOperation(String),

    /// The address token is not a `0x`-prefixed hexadecimal literal.
    #[error("invalid address {0:?} (expected a 0x-prefixed hexadecimal value)")]
    InvalidAddress(String),
}

/// Top-level failure of a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A trace or parameter file could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path of the file being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A trace line failed to parse.
    #[error("command format error at line {line}: {source}")]
    TraceFormat {
        /// 1-based line number within the trace.
        line: usize,
        /// What was wrong with the line.
        #[source]
        source: TraceError,
    },
}
