//! Set-Associative Cache.
//!
//! This module implements one level of the hierarchy: `num_sets` LRU sets plus
//! the access/miss counters for that level. It models:
//! 1. **Lookups:** [`Cache::access`] is the only CPU-visible operation and the
//!    only one that touches the counters. A miss does not install anything.
//! 2. **Fills:** [`Cache::insert_block`] installs a block and reports what it displaced.
//! 3. **Maintenance:** [`Cache::snoop`] and [`Cache::update_dirty_block`] keep an
//!    inclusive, write-back hierarchy consistent.

/// Address to `(set, tag)` decomposition.
pub mod decoder;

/// A single LRU set.
pub mod set;

use std::collections::BTreeMap;

use tracing::trace;

use self::decoder::AddressDecoder;
use self::set::{CacheLine, CacheSet};
use crate::common::{ConfigError, Level};
use crate::config::{CacheConfig, Geometry};

/// Outcome of installing a block.
///
/// "No eviction" is its own variant, so a victim at address 0 can never be
/// confused with an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eviction {
    /// An empty way or an invalidated line was used; nothing live was displaced.
    Installed,
    /// A valid block was displaced to make room.
    InstalledWithEviction {
        /// Block-aligned address of the displaced block.
        address: u64,
        /// Whether the displaced block held unwritten data.
        was_dirty: bool,
    },
}

impl Eviction {
    /// Address of the displaced block, if any.
    pub const fn evicted_address(&self) -> Option<u64> {
        match *self {
            Self::Installed => None,
            Self::InstalledWithEviction { address, .. } => Some(address),
        }
    }

    /// Address of the displaced block if it was dirty.
    pub const fn dirty_victim(&self) -> Option<u64> {
        match *self {
            Self::InstalledWithEviction {
                address,
                was_dirty: true,
            } => Some(address),
            _ => None,
        }
    }
}

/// One cache level.
///
/// Each instance owns its lines and its counters; L1 and L2 are two separate
/// `Cache` values.
///
/// Sets are allocated on first fill, so memory grows with the number of
/// distinct sets a trace touches rather than with the configured capacity.
#[derive(Debug, Clone)]
pub struct Cache {
    level: Level,
    geometry: Geometry,
    decoder: AddressDecoder,
    sets: BTreeMap<usize, CacheSet>,
    latency: u64,
    total_accesses: u64,
    misses: u64,
}

impl Cache {
    /// Creates an empty cache level.
    ///
    /// # Arguments
    ///
    /// * `level` - Which level this is (used in diagnostics).
    /// * `config` - Capacity, associativity and hit latency.
    /// * `block_bytes` - Block size shared by the hierarchy.
    ///
    /// # Errors
    ///
    /// Any geometry error from [`CacheConfig::geometry`].
    pub fn new(level: Level, config: &CacheConfig, block_bytes: u64) -> Result<Self, ConfigError> {
        let geometry = config.geometry(level, block_bytes)?;
        Ok(Self {
            level,
            geometry,
            decoder: AddressDecoder::new(&geometry),
            sets: BTreeMap::new(),
            latency: config.latency,
            total_accesses: 0,
            misses: 0,
        })
    }

    /// Looks up the cache on behalf of the CPU or the level above.
    ///
    /// Always counts an access. On a hit the block moves to MRU and picks up
    /// the dirty bit if `is_write`. On a miss the miss counter is bumped and
    /// nothing is installed; the caller decides whether and when to fill.
    ///
    /// # Returns
    ///
    /// `true` on a hit.
    pub fn access(&mut self, addr: u64, is_write: bool) -> bool {
        self.total_accesses += 1;
        let (set, tag) = self.decoder.decode(addr);
        let hit = self
            .sets
            .get_mut(&set)
            .is_some_and(|s| s.touch_to_front(tag, is_write));
        if !hit {
            self.misses += 1;
        }
        hit
    }

    /// Installs the block containing `addr` as a valid line with `dirty = is_write`.
    ///
    /// The new line always lands at MRU. See [`CacheSet::insert`] for victim
    /// selection. Counters are not affected.
    pub fn insert_block(&mut self, addr: u64, is_write: bool) -> Eviction {
        let (set, tag) = self.decoder.decode(addr);
        let ways = self.geometry.ways as usize;
        let victim = self
            .sets
            .entry(set)
            .or_insert_with(|| CacheSet::new(ways))
            .insert(tag, is_write);
        match victim {
            None => Eviction::Installed,
            Some(victim) => {
                let address = self.decoder.address(set, victim.tag);
                trace!(
                    cache = %self.level,
                    victim = format_args!("{address:#x}"),
                    dirty = victim.dirty,
                    "evicted block"
                );
                Eviction::InstalledWithEviction {
                    address,
                    was_dirty: victim.dirty,
                }
            }
        }
    }

    /// Invalidates the block containing `addr`, if resident.
    ///
    /// Any dirty data in the line is dropped. Counters are not affected.
    pub fn snoop(&mut self, addr: u64) {
        let (set, tag) = self.decoder.decode(addr);
        if let Some(line) = self.sets.get_mut(&set).and_then(|s| s.invalidate(tag)) {
            trace!(
                cache = %self.level,
                addr = format_args!("{addr:#x}"),
                dirty = line.dirty,
                "snooped out"
            );
        }
    }

    /// Marks the block containing `addr` dirty and moves it to MRU.
    ///
    /// Counters are not affected.
    ///
    /// # Returns
    ///
    /// `true` if the block was resident.
    pub fn update_dirty_block(&mut self, addr: u64) -> bool {
        let (set, tag) = self.decoder.decode(addr);
        self.sets
            .get_mut(&set)
            .is_some_and(|s| s.touch_to_front(tag, true))
    }

    /// Non-mutating residency check. Does not count as an access.
    pub fn contains(&self, addr: u64) -> bool {
        self.line(addr).is_some()
    }

    /// The resident line for `addr`, if any.
    pub fn line(&self, addr: u64) -> Option<&CacheLine> {
        let (set, tag) = self.decoder.decode(addr);
        self.sets.get(&set)?.get(tag)
    }

    /// `Some(dirty)` if the block containing `addr` is resident.
    pub fn is_dirty(&self, addr: u64) -> Option<bool> {
        self.line(addr).map(|l| l.dirty)
    }

    /// Block-aligned addresses of every valid line, set by set, MRU first.
    pub fn resident_blocks(&self) -> impl Iterator<Item = u64> + '_ {
        self.sets.iter().flat_map(move |(&index, set)| {
            set.lines()
                .iter()
                .filter(|l| l.valid)
                .map(move |l| self.decoder.address(index, l.tag))
        })
    }

    /// Sets filled at least once, in set-index order.
    pub fn sets(&self) -> impl Iterator<Item = (usize, &CacheSet)> + '_ {
        self.sets.iter().map(|(&index, set)| (index, set))
    }

    /// The set that `addr` maps to, if anything has been filled into it.
    pub fn set_for(&self, addr: u64) -> Option<&CacheSet> {
        self.sets.get(&self.decoder.set_index(addr))
    }

    /// Address decoder for this level.
    pub const fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }

    /// Which level this is.
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Set/way/block layout.
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Hit latency in cycles.
    pub const fn latency(&self) -> u64 {
        self.latency
    }

    /// Number of [`Cache::access`] calls so far.
    pub const fn total_accesses(&self) -> u64 {
        self.total_accesses
    }

    /// Number of [`Cache::access`] calls that missed.
    pub const fn misses(&self) -> u64 {
        self.misses
    }

    /// Number of [`Cache::access`] calls that hit.
    pub const fn hits(&self) -> u64 {
        self.total_accesses - self.misses
    }
}
