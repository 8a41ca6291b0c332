//! # Configuration Tests
//!
//! Tests for the raw log2 parameter set, its validation into a hierarchy
//! configuration, parameter file layering, and derived geometry.

use cachesim_core::common::{ConfigError, Level};
use cachesim_core::config::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Small valid parameter set: 64-byte blocks, 1 KiB 2-way L1, 8 KiB 4-way L2.
fn params() -> SimParams {
    SimParams {
        mem_cyc: 100,
        bsize: 6,
        l1_size: 10,
        l2_size: 13,
        l1_assoc: 1,
        l2_assoc: 2,
        l1_cyc: 1,
        l2_cyc: 10,
        wr_alloc: 1,
    }
}

fn full_partial() -> PartialSimParams {
    PartialSimParams {
        mem_cyc: Some(100),
        bsize: Some(6),
        l1_size: Some(10),
        l2_size: Some(13),
        l1_assoc: Some(1),
        l2_assoc: Some(2),
        l1_cyc: Some(1),
        l2_cyc: Some(10),
        wr_alloc: Some(1),
    }
}

// ══════════════════════════════════════════════════════════
// 1. Defaults
// ══════════════════════════════════════════════════════════

#[test]
fn test_hierarchy_config_defaults() {
    let config = HierarchyConfig::default();
    assert_eq!(config.block_bytes, 64);
    assert_eq!(config.memory_latency, 100);
    assert_eq!(config.l1.size_bytes, 32 * 1024);
    assert_eq!(config.l1.ways, 4);
    assert_eq!(config.l1.latency, 1);
    assert_eq!(config.l2.size_bytes, 256 * 1024);
    assert_eq!(config.l2.ways, 8);
    assert_eq!(config.l2.latency, 10);
    assert_eq!(config.policy, HierarchyPolicy::default());
    assert!(config.validate().is_ok());
}

#[test]
fn test_policy_defaults() {
    let policy = HierarchyPolicy::default();
    assert_eq!(policy.write_miss, WriteMissPolicy::Allocate);
    assert_eq!(policy.inclusion, InclusionPolicy::Inclusive);
    assert!(policy.write_allocate());
}

#[rstest]
#[case(true, WriteMissPolicy::Allocate)]
#[case(false, WriteMissPolicy::NoAllocate)]
fn test_policy_from_write_allocate(#[case] flag: bool, #[case] expected: WriteMissPolicy) {
    let policy = HierarchyPolicy::from_write_allocate(flag);
    assert_eq!(policy.write_miss, expected);
    assert_eq!(policy.inclusion, InclusionPolicy::Inclusive);
    assert_eq!(policy.write_allocate(), flag);
}

// ══════════════════════════════════════════════════════════
// 2. Raw Parameters
// ══════════════════════════════════════════════════════════

#[test]
fn test_params_exponentiated() {
    let config = params().into_config().unwrap();
    assert_eq!(config.block_bytes, 64);
    assert_eq!(config.memory_latency, 100);
    assert_eq!(
        config.l1,
        CacheConfig {
            size_bytes: 1024,
            ways: 2,
            latency: 1
        }
    );
    assert_eq!(
        config.l2,
        CacheConfig {
            size_bytes: 8192,
            ways: 4,
            latency: 10
        }
    );
    assert!(config.policy.write_allocate());

    let (l1, l2) = config.validate().unwrap();
    assert_eq!(l1.num_sets, 8);
    assert_eq!(l2.num_sets, 32);
}

#[test]
fn test_params_no_write_allocate() {
    let config = SimParams {
        wr_alloc: 0,
        ..params()
    }
    .into_config()
    .unwrap();
    assert_eq!(config.policy.write_miss, WriteMissPolicy::NoAllocate);
}

#[rstest]
#[case::wr_alloc_two(SimParams { wr_alloc: 2, ..params() }, ConfigError::InvalidWriteAllocate(2))]
#[case::bsize_too_large(
    SimParams { bsize: 64, ..params() },
    ConfigError::ExponentOutOfRange { name: "bsize", value: 64 }
)]
#[case::l2_assoc_too_large(
    SimParams { l2_assoc: 70, ..params() },
    ConfigError::ExponentOutOfRange { name: "l2-assoc", value: 70 }
)]
#[case::l1_smaller_than_block(
    SimParams { l1_size: 5, ..params() },
    ConfigError::UnevenGeometry { level: Level::L1, size_bytes: 32, ways: 2, block_bytes: 64 }
)]
#[case::l1_smaller_than_set(
    SimParams { l1_size: 6, l1_assoc: 2, ..params() },
    ConfigError::UnevenGeometry { level: Level::L1, size_bytes: 64, ways: 4, block_bytes: 64 }
)]
#[case::l2_smaller_than_set(
    SimParams { l2_size: 7, ..params() },
    ConfigError::UnevenGeometry { level: Level::L2, size_bytes: 128, ways: 4, block_bytes: 64 }
)]
fn test_params_rejected(#[case] params: SimParams, #[case] expected: ConfigError) {
    assert_eq!(params.into_config().unwrap_err(), expected);
}

#[test]
fn test_wr_alloc_checked_before_exponents() {
    let params = SimParams {
        wr_alloc: 7,
        bsize: 99,
        ..params()
    };
    assert_eq!(
        params.into_config().unwrap_err(),
        ConfigError::InvalidWriteAllocate(7)
    );
}

#[test]
fn test_exponent_zero_is_one() {
    // 1-byte blocks, direct-mapped, one set each.
    let config = SimParams {
        bsize: 0,
        l1_size: 0,
        l2_size: 0,
        l1_assoc: 0,
        l2_assoc: 0,
        ..params()
    }
    .into_config()
    .unwrap();
    let (l1, l2) = config.validate().unwrap();
    assert_eq!((l1.num_sets, l1.ways, l1.block_bytes), (1, 1, 1));
    assert_eq!((l2.num_sets, l2.ways, l2.block_bytes), (1, 1, 1));
}

// ══════════════════════════════════════════════════════════
// 3. Geometry
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::block(CacheConfig { size_bytes: 1024, ways: 2, latency: 1 }, 0, "block size")]
#[case::ways(CacheConfig { size_bytes: 1024, ways: 0, latency: 1 }, 64, "associativity")]
#[case::capacity(CacheConfig { size_bytes: 0, ways: 2, latency: 1 }, 64, "capacity")]
fn test_zero_dimension_rejected(
    #[case] config: CacheConfig,
    #[case] block_bytes: u64,
    #[case] what: &'static str,
) {
    assert_eq!(
        config.geometry(Level::L2, block_bytes).unwrap_err(),
        ConfigError::ZeroSized {
            level: Level::L2,
            what
        }
    );
}

#[test]
fn test_non_power_of_two_geometry_allowed_when_even() {
    let geometry = CacheConfig {
        size_bytes: 192,
        ways: 3,
        latency: 1,
    }
    .geometry(Level::L1, 64)
    .unwrap();
    assert_eq!(geometry.num_sets, 1);
    assert_eq!(geometry.size_bytes(), 192);
}

#[test]
fn test_geometry_overflow_is_uneven() {
    let err = CacheConfig {
        size_bytes: 1 << 40,
        ways: 1 << 40,
        latency: 1,
    }
    .geometry(Level::L1, 1 << 40)
    .unwrap_err();
    assert!(matches!(err, ConfigError::UnevenGeometry { .. }));
}

#[test]
fn test_validate_checks_l1_first() {
    let config = HierarchyConfig {
        l1: CacheConfig {
            size_bytes: 0,
            ways: 1,
            latency: 1,
        },
        l2: CacheConfig {
            size_bytes: 0,
            ways: 1,
            latency: 1,
        },
        ..HierarchyConfig::default()
    };
    assert_eq!(
        config.validate().unwrap_err(),
        ConfigError::ZeroSized {
            level: Level::L1,
            what: "capacity"
        }
    );
}

// ══════════════════════════════════════════════════════════
// 4. Parameter Files
// ══════════════════════════════════════════════════════════

#[test]
fn test_partial_params_from_json() {
    let partial = PartialSimParams::from_json_str(r#"{ "mem-cyc": 50, "l1-assoc": 3 }"#).unwrap();
    assert_eq!(
        partial,
        PartialSimParams {
            mem_cyc: Some(50),
            l1_assoc: Some(3),
            ..PartialSimParams::default()
        }
    );
}

#[rstest]
#[case::unknown_key(r#"{ "cache-size": 10 }"#)]
#[case::wrong_type(r#"{ "bsize": "six" }"#)]
#[case::negative(r#"{ "bsize": -1 }"#)]
#[case::not_json("bsize = 6")]
fn test_partial_params_malformed(#[case] text: &str) {
    assert!(matches!(
        PartialSimParams::from_json_str(text),
        Err(ConfigError::Malformed(_))
    ));
}

#[test]
fn test_merge_overrides_win() {
    let file = full_partial();
    let flags = PartialSimParams {
        mem_cyc: Some(200),
        wr_alloc: Some(0),
        ..PartialSimParams::default()
    };
    let merged = file.merge(flags).resolve().unwrap();
    assert_eq!(merged.mem_cyc, 200);
    assert_eq!(merged.wr_alloc, 0);
    assert_eq!(merged.bsize, 6);
    assert_eq!(merged.l2_cyc, 10);
}

#[test]
fn test_merge_fills_gaps() {
    let file = PartialSimParams {
        l2_cyc: Some(12),
        ..PartialSimParams::default()
    };
    let flags = PartialSimParams {
        l2_cyc: None,
        ..full_partial()
    };
    assert_eq!(file.merge(flags).resolve().unwrap().l2_cyc, 12);
}

#[test]
fn test_resolve_complete() {
    assert_eq!(full_partial().resolve().unwrap(), params());
}

#[test]
fn test_resolve_reports_first_missing_in_order() {
    assert_eq!(
        PartialSimParams::default().resolve().unwrap_err(),
        ConfigError::MissingParameter("mem-cyc")
    );

    let partial = PartialSimParams {
        l1_cyc: None,
        wr_alloc: None,
        ..full_partial()
    };
    assert_eq!(
        partial.resolve().unwrap_err(),
        ConfigError::MissingParameter("l1-cyc")
    );
}

#[test]
fn test_hierarchy_config_policy_defaults_in_json() {
    let json = r#"{
        "block_bytes": 32,
        "memory_latency": 80,
        "l1": { "size_bytes": 512, "ways": 1, "latency": 2 },
        "l2": { "size_bytes": 4096, "ways": 8, "latency": 12 }
    }"#;
    let config: HierarchyConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.policy, HierarchyPolicy::default());
    let (l1, l2) = config.validate().unwrap();
    assert_eq!(l1.num_sets, 16);
    assert_eq!(l2.num_sets, 16);
}

#[test]
fn test_error_messages_name_the_parameter() {
    assert_eq!(
        ConfigError::MissingParameter("l2-size").to_string(),
        "missing required parameter --l2-size"
    );
    assert_eq!(
        ConfigError::InvalidWriteAllocate(3).to_string(),
        "parameter --wr-alloc must be 0 or 1, got 3"
    );
}
