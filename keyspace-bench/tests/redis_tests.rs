//! Redis Tests
//!
//! Run the scenarios against a real Redis server. Ignored by default:
//!
//! ```text
//! REDIS_URL=redis://127.0.0.1:6379 cargo test -p keyspace-bench --test redis_tests -- --ignored --test-threads=1
//! ```
//!
//! Each test flushes the whole database, so point REDIS_URL at a scratch
//! instance.

use keyspace_bench::config::{
    BenchConfig, DatasetConfig, ScenarioConfig, StoreConfig, ThresholdConfig, VerifyMode,
    DEFAULT_REDIS_URL,
};
use keyspace_bench::strategy::{ScanMode, StrategyKind};
use keyspace_bench::scenario::run_suite;
use keyspace_common::{KeyValueStore, RedisStore, StoreBackend};

fn redis_url() -> String {
    dotenv::dotenv().ok();
    std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string())
}

fn connect() -> RedisStore {
    let mut store = RedisStore::connect(&redis_url()).expect("Redis not reachable, set REDIS_URL");
    store.flush_all().unwrap();
    store
}

fn redis_config(groups: u32, members: u32) -> BenchConfig {
    BenchConfig {
        dataset: DatasetConfig {
            groups,
            members_per_group: members,
            filler: "payload".to_string(),
        },
        store: StoreConfig {
            backend: StoreBackend::Redis,
            url: redis_url(),
            flush_before_run: true,
        },
        scenario: ScenarioConfig {
            verify: VerifyMode::Full,
            ..Default::default()
        },
        thresholds: ThresholdConfig::default(),
    }
}

#[test]
#[ignore]
fn test_suite_against_redis() {
    let mut store = connect();
    let report = run_suite(&mut store, &redis_config(20, 50)).unwrap();

    assert!(report.passed());
    assert_eq!(report.backend, StoreBackend::Redis);
    let flat = &report.scenarios[0];
    assert_eq!(flat.strategy, StrategyKind::Flat);
    assert_eq!(flat.keys_before_invalidate - flat.keys_after_invalidate, 50);
    assert!(flat.memory_stats.total_allocated().is_some());
    assert_eq!(store.dbsize().unwrap(), 0);
}

#[test]
#[ignore]
fn test_scan_mode_and_pipelined_fill() {
    let mut config = redis_config(15, 40);
    config.scenario.scan_mode = ScanMode::Scan;
    config.scenario.scan_count = 25;
    config.scenario.fill_batch_size = 64;

    let mut store = connect();
    let report = run_suite(&mut store, &config).unwrap();

    assert!(report.passed());
    assert_eq!(report.scenarios[0].unlinked, 40);
    assert_eq!(report.scenarios[2].unlinked, 41);
}

#[test]
#[ignore]
fn test_memory_stats_parse() {
    let mut store = connect();
    store.set("probe", "value").unwrap();

    let stats = store.memory_stats().unwrap();
    assert!(stats.peak_allocated().is_some());
    assert_eq!(stats.keys_count(), Some(1));
    assert!(stats.fragmentation_ratio().is_some());

    store.flush_all().unwrap();
}
