//! Configuration system for the cache hierarchy model.
//!
//! This module defines the configuration structures used to parameterize a run.
//! It provides:
//! 1. **Defaults:** Baseline geometry and latency constants for both levels.
//! 2. **Structures:** Per-level cache config, the hierarchy config, and the explicit policy.
//! 3. **Parameters:** The raw log2-encoded parameter set accepted on the command line
//!    or from a JSON file, plus its validation into a [`HierarchyConfig`].
//!
//! Every size-like raw parameter is a log2 exponent; [`SimParams::into_config`]
//! exponentiates them and checks that each level divides into whole sets.

use serde::{Deserialize, Serialize};

use crate::common::{ConfigError, Level};

/// Default configuration constants.
///
/// Used by the `Default` impls; the command line never relies on them because
/// every raw parameter is required there.
mod defaults {
    /// Block size shared by both levels (64 bytes).
    pub const BLOCK_BYTES: u64 = 64;

    /// Main memory access latency in cycles.
    pub const MEMORY_LATENCY: u64 = 100;

    /// L1 capacity (32 KiB).
    pub const L1_SIZE: u64 = 32 * 1024;

    /// L1 associativity.
    pub const L1_WAYS: u64 = 4;

    /// L1 hit latency in cycles.
    pub const L1_LATENCY: u64 = 1;

    /// L2 capacity (256 KiB).
    pub const L2_SIZE: u64 = 256 * 1024;

    /// L2 associativity.
    pub const L2_WAYS: u64 = 8;

    /// L2 hit latency in cycles.
    pub const L2_LATENCY: u64 = 10;
}

/// Behaviour on a CPU write that misses in L1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum WriteMissPolicy {
    /// Fetch the block through L2 and install it in L1 (marked dirty).
    #[default]
    Allocate,
    /// Leave L1 untouched; mark the L2 copy dirty if there is one, otherwise
    /// the write goes straight to memory.
    NoAllocate,
}

/// Relationship between the contents of L1 and L2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum InclusionPolicy {
    /// Every valid L1 block is also in L2. An L2 eviction snoops L1.
    #[default]
    Inclusive,
    /// L2 evictions leave L1 alone.
    NonInclusive,
}

/// Hierarchy-wide policy.
///
/// Both levels are write-back; there is no write-through mode. The default is
/// write-allocate and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct HierarchyPolicy {
    /// Write-miss handling, shared by both levels.
    #[serde(default)]
    pub write_miss: WriteMissPolicy,
    /// Inclusion maintenance.
    #[serde(default)]
    pub inclusion: InclusionPolicy,
}

impl HierarchyPolicy {
    /// Builds the policy selected by the `wr-alloc` flag, keeping the hierarchy inclusive.
    pub const fn from_write_allocate(write_allocate: bool) -> Self {
        Self {
            write_miss: if write_allocate {
                WriteMissPolicy::Allocate
            } else {
                WriteMissPolicy::NoAllocate
            },
            inclusion: InclusionPolicy::Inclusive,
        }
    }

    /// Returns `true` when write misses install the block in L1.
    pub const fn write_allocate(&self) -> bool {
        matches!(self.write_miss, WriteMissPolicy::Allocate)
    }
}

/// Individual cache level configuration, with sizes already in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Total capacity in bytes.
    pub size_bytes: u64,
    /// Associativity (ways per set).
    pub ways: u64,
    /// Hit latency in cycles.
    pub latency: u64,
}

/// Set/way/block layout derived from a [`CacheConfig`] and the shared block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    /// Number of sets.
    pub num_sets: u64,
    /// Ways per set.
    pub ways: u64,
    /// Block size in bytes.
    pub block_bytes: u64,
}

impl Geometry {
    /// Total capacity described by this geometry.
    pub const fn size_bytes(&self) -> u64 {
        self.num_sets * self.ways * self.block_bytes
    }
}

impl CacheConfig {
    /// Derives the set layout for this level.
    ///
    /// # Arguments
    ///
    /// * `level` - Which level this config describes (for diagnostics).
    /// * `block_bytes` - Block size shared by the hierarchy.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroSized`] if any dimension is zero, and
    /// [`ConfigError::UnevenGeometry`] if `ways * block_bytes` does not divide
    /// the capacity into at least one whole set.
    pub fn geometry(&self, level: Level, block_bytes: u64) -> Result<Geometry, ConfigError> {
        if block_bytes == 0 {
            return Err(ConfigError::ZeroSized {
                level,
                what: "block size",
            });
        }
        if self.ways == 0 {
            return Err(ConfigError::ZeroSized {
                level,
                what: "associativity",
            });
        }
        if self.size_bytes == 0 {
            return Err(ConfigError::ZeroSized {
                level,
                what: "capacity",
            });
        }

        let uneven = || ConfigError::UnevenGeometry {
            level,
            size_bytes: self.size_bytes,
            ways: self.ways,
            block_bytes,
        };

        let set_bytes = self.ways.checked_mul(block_bytes).ok_or_else(uneven)?;
        if self.size_bytes < set_bytes || self.size_bytes % set_bytes != 0 {
            return Err(uneven());
        }

        Ok(Geometry {
            num_sets: self.size_bytes / set_bytes,
            ways: self.ways,
            block_bytes,
        })
    }
}

/// Root configuration of a two-level hierarchy.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::{HierarchyConfig, WriteMissPolicy};
///
/// let json = r#"{
///     "block_bytes": 64,
///     "memory_latency": 100,
///     "l1": { "size_bytes": 1024, "ways": 2, "latency": 1 },
///     "l2": { "size_bytes": 8192, "ways": 4, "latency": 10 },
///     "policy": { "write_miss": "NoAllocate" }
/// }"#;
///
/// let config: HierarchyConfig = serde_json::from_str(json).unwrap();
/// let (l1, l2) = config.validate().unwrap();
/// assert_eq!(l1.num_sets, 8);
/// assert_eq!(l2.num_sets, 32);
/// assert_eq!(config.policy.write_miss, WriteMissPolicy::NoAllocate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct HierarchyConfig {
    /// Block size in bytes, shared by both levels.
    pub block_bytes: u64,
    /// Main memory latency in cycles.
    pub memory_latency: u64,
    /// First-level cache.
    pub l1: CacheConfig,
    /// Second-level cache.
    pub l2: CacheConfig,
    /// Write-miss and inclusion policy.
    #[serde(default)]
    pub policy: HierarchyPolicy,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            block_bytes: defaults::BLOCK_BYTES,
            memory_latency: defaults::MEMORY_LATENCY,
            l1: CacheConfig {
                size_bytes: defaults::L1_SIZE,
                ways: defaults::L1_WAYS,
                latency: defaults::L1_LATENCY,
            },
            l2: CacheConfig {
                size_bytes: defaults::L2_SIZE,
                ways: defaults::L2_WAYS,
                latency: defaults::L2_LATENCY,
            },
            policy: HierarchyPolicy::default(),
        }
    }
}

impl HierarchyConfig {
    /// Validates both levels and returns their geometries as `(l1, l2)`.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError`] found, checking L1 before L2.
    pub fn validate(&self) -> Result<(Geometry, Geometry), ConfigError> {
        let l1 = self.l1.geometry(Level::L1, self.block_bytes)?;
        let l2 = self.l2.geometry(Level::L2, self.block_bytes)?;
        Ok((l1, l2))
    }
}

/// Raw run parameters, exactly as given on the command line.
///
/// `bsize`, `l1-size`, `l2-size`, `l1-assoc` and `l2-assoc` are log2
/// exponents; the cycle counts are plain values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SimParams {
    /// Memory latency in cycles.
    pub mem_cyc: u64,
    /// log2 of the block size in bytes.
    pub bsize: u32,
    /// log2 of the L1 capacity in bytes.
    pub l1_size: u32,
    /// log2 of the L2 capacity in bytes.
    pub l2_size: u32,
    /// log2 of the L1 way count.
    pub l1_assoc: u32,
    /// log2 of the L2 way count.
    pub l2_assoc: u32,
    /// L1 hit latency in cycles.
    pub l1_cyc: u64,
    /// L2 hit latency in cycles.
    pub l2_cyc: u64,
    /// 1 for write-allocate, 0 for no-write-allocate.
    pub wr_alloc: u32,
}

/// Computes `2^exponent`, rejecting exponents that overflow a `u64`.
fn pow2(name: &'static str, exponent: u32) -> Result<u64, ConfigError> {
    1u64.checked_shl(exponent)
        .ok_or(ConfigError::ExponentOutOfRange {
            name,
            value: exponent,
        })
}

impl SimParams {
    /// Exponentiates the log2 parameters and validates the resulting hierarchy.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ExponentOutOfRange`] for exponents of 64 or more,
    /// [`ConfigError::InvalidWriteAllocate`] when `wr-alloc` is not 0 or 1,
    /// and any geometry error from [`HierarchyConfig::validate`].
    pub fn into_config(self) -> Result<HierarchyConfig, ConfigError> {
        let write_allocate = match self.wr_alloc {
            0 => false,
            1 => true,
            other => return Err(ConfigError::InvalidWriteAllocate(other)),
        };

        let config = HierarchyConfig {
            block_bytes: pow2("bsize", self.bsize)?,
            memory_latency: self.mem_cyc,
            l1: CacheConfig {
                size_bytes: pow2("l1-size", self.l1_size)?,
                ways: pow2("l1-assoc", self.l1_assoc)?,
                latency: self.l1_cyc,
            },
            l2: CacheConfig {
                size_bytes: pow2("l2-size", self.l2_size)?,
                ways: pow2("l2-assoc", self.l2_assoc)?,
                latency: self.l2_cyc,
            },
            policy: HierarchyPolicy::from_write_allocate(write_allocate),
        };
        let _ = config.validate()?;
        Ok(config)
    }
}

/// A possibly incomplete [`SimParams`], used to layer a parameter file under
/// command-line flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialSimParams {
    /// Memory latency in cycles.
    pub mem_cyc: Option<u64>,
    /// log2 of the block size in bytes.
    pub bsize: Option<u32>,
    /// log2 of the L1 capacity in bytes.
    pub l1_size: Option<u32>,
    /// log2 of the L2 capacity in bytes.
    pub l2_size: Option<u32>,
    /// log2 of the L1 way count.
    pub l1_assoc: Option<u32>,
    /// log2 of the L2 way count.
    pub l2_assoc: Option<u32>,
    /// L1 hit latency in cycles.
    pub l1_cyc: Option<u64>,
    /// L2 hit latency in cycles.
    pub l2_cyc: Option<u64>,
    /// 1 for write-allocate, 0 for no-write-allocate.
    pub wr_alloc: Option<u32>,
}

impl PartialSimParams {
    /// Parses a JSON parameter file using the command-line key names.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Malformed`] if the text is not a JSON object of known keys.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Layers `overrides` on top of `self`; any value set in `overrides` wins.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            mem_cyc: overrides.mem_cyc.or(self.mem_cyc),
            bsize: overrides.bsize.or(self.bsize),
            l1_size: overrides.l1_size.or(self.l1_size),
            l2_size: overrides.l2_size.or(self.l2_size),
            l1_assoc: overrides.l1_assoc.or(self.l1_assoc),
            l2_assoc: overrides.l2_assoc.or(self.l2_assoc),
            l1_cyc: overrides.l1_cyc.or(self.l1_cyc),
            l2_cyc: overrides.l2_cyc.or(self.l2_cyc),
            wr_alloc: overrides.wr_alloc.or(self.wr_alloc),
        }
    }

    /// Requires every parameter to be present.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingParameter`] naming the first absent key, in
    /// command-line order.
    pub fn resolve(self) -> Result<SimParams, ConfigError> {
        Ok(SimParams {
            mem_cyc: self
                .mem_cyc
                .ok_or(ConfigError::MissingParameter("mem-cyc"))?,
            bsize: self.bsize.ok_or(ConfigError::MissingParameter("bsize"))?,
            l1_size: self
                .l1_size
                .ok_or(ConfigError::MissingParameter("l1-size"))?,
            l2_size: self
                .l2_size
                .ok_or(ConfigError::MissingParameter("l2-size"))?,
            l1_assoc: self
                .l1_assoc
                .ok_or(ConfigError::MissingParameter("l1-assoc"))?,
            l2_assoc: self
                .l2_assoc
                .ok_or(ConfigError::MissingParameter("l2-assoc"))?,
            l1_cyc: self.l1_cyc.ok_or(ConfigError::MissingParameter("l1-cyc"))?,
            l2_cyc: self.l2_cyc.ok_or(ConfigError::MissingParameter("l2-cyc"))?,
            wr_alloc: self
                .wr_alloc
                .ok_or(ConfigError::MissingParameter("wr-alloc"))?,
        })
    }
}
