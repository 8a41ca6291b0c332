//! Address decomposition.
//!
//! Splits a byte address into the set it maps to and the tag that identifies
//! it within that set, and rebuilds the block address from the pair. The byte
//! offset inside a block is discarded: the model never transfers sub-blocks.

use crate::config::Geometry;

/// Stateless mapping between byte addresses and `(set, tag)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDecoder {
    block_bytes: u64,
    num_sets: u64,
}

impl AddressDecoder {
    /// Creates a decoder for the given geometry.
    pub const fn new(geometry: &Geometry) -> Self {
        Self {
            block_bytes: geometry.block_bytes,
            num_sets: geometry.num_sets,
        }
    }

    /// Set index: `(addr / block_bytes) % num_sets`.
    #[inline]
    pub const fn set_index(&self, addr: u64) -> usize {
        ((addr / self.block_bytes) % self.num_sets) as usize
    }

    /// Tag: `(addr / block_bytes) / num_sets`.
    #[inline]
    pub const fn tag(&self, addr: u64) -> u64 {
        (addr / self.block_bytes) / self.num_sets
    }

    /// Both halves of the decomposition at once, as `(set, tag)`.
    #[inline]
    pub const fn decode(&self, addr: u64) -> (usize, u64) {
        (self.set_index(addr), self.tag(addr))
    }

    /// Rebuilds the block-aligned address of a block.
    ///
    /// For any address `a`, `address(set_index(a), tag(a))` is `a` rounded
    /// down to its block boundary.
    #[inline]
    pub const fn address(&self, set: usize, tag: u64) -> u64 {
        (tag * self.num_sets + set as u64) * self.block_bytes
    }
}
