//! Shared fixtures and harness helpers.

use std::io::{Cursor, Write};

use cachesim_core::common::Level;
use cachesim_core::config::{
    CacheConfig, HierarchyConfig, HierarchyPolicy, InclusionPolicy, WriteMissPolicy,
};
use cachesim_core::core::{Cache, MemoryHierarchy};
use cachesim_core::sim::TraceReader;
use tempfile::NamedTempFile;
use tracing_subscriber::EnvFilter;

/// Block size used by the tiny hierarchy.
pub const BLOCK: u64 = 16;
/// L1 hit latency.
pub const L1_CYC: u64 = 1;
/// L2 hit latency.
pub const L2_CYC: u64 = 10;
/// Memory latency.
pub const MEM_CYC: u64 = 100;

/// Cost of a reference that misses both levels.
pub const FULL_MISS: u64 = L1_CYC + L2_CYC + MEM_CYC;
/// Cost of a reference that misses L1 and hits L2.
pub const L2_HIT: u64 = L1_CYC + L2_CYC;

/// Routes `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// A small, hand-checkable hierarchy.
///
/// - 16-byte blocks
/// - L1: 64 bytes, 2-way  → 2 sets, set = (addr / 16) % 2
/// - L2: 256 bytes, 4-way → 4 sets, set = (addr / 16) % 4
///
/// Addresses 0x00, 0x40, 0x80, 0xc0, 0x100 all land in L1 set 0 *and* L2 set 0.
pub fn tiny_config(write_miss: WriteMissPolicy, inclusion: InclusionPolicy) -> HierarchyConfig {
    HierarchyConfig {
        block_bytes: BLOCK,
        memory_latency: MEM_CYC,
        l1: CacheConfig {
            size_bytes: 64,
            ways: 2,
            latency: L1_CYC,
        },
        l2: CacheConfig {
            size_bytes: 256,
            ways: 4,
            latency: L2_CYC,
        },
        policy: HierarchyPolicy {
            write_miss,
            inclusion,
        },
    }
}

/// Tiny hierarchy, inclusive, with the given write-miss policy.
pub fn tiny_hierarchy(write_miss: WriteMissPolicy) -> MemoryHierarchy {
    init_tracing();
    MemoryHierarchy::new(&tiny_config(write_miss, InclusionPolicy::Inclusive))
        .expect("tiny config is valid")
}

/// A standalone cache level.
pub fn cache(size_bytes: u64, ways: u64, block_bytes: u64) -> Cache {
    Cache::new(
        Level::L1,
        &CacheConfig {
            size_bytes,
            ways,
            latency: L1_CYC,
        },
        block_bytes,
    )
    .expect("valid cache geometry")
}

/// Builds the address of block `tag` in `set` for a cache with `num_sets` sets.
pub fn addr_in_set(tag: u64, set: u64, num_sets: u64, block_bytes: u64) -> u64 {
    (tag * num_sets + set) * block_bytes
}

/// A trace reader over in-memory text.
pub fn trace_from(text: &str) -> TraceReader<Cursor<Vec<u8>>> {
    TraceReader::new(Cursor::new(text.as_bytes().to_vec()), "<memory>")
}

/// Writes `text` to a temporary trace file.
pub fn temp_trace(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
