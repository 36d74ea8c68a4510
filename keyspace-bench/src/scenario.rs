//! Scenario runner
//!
//! One scenario runs a single strategy through fill, invalidate and probe
//! against a store that starts empty, then captures the store's memory
//! statistics. [`run_suite`] runs the configured strategies one after another
//! with a full flush between them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use keyspace_common::{KeyValueStore, MemoryStats, StoreBackend, StoreResult, WriteOp};

use crate::config::{BenchConfig, ThresholdConfig};
use crate::dataset::{Dataset, DatasetSummary};
use crate::error::BenchResult;
use crate::fixture::{prepare_store, run_isolated};
use crate::strategy::{InvalidationStrategy, StrategyKind};
use crate::timing::{measure, PhaseTimings};
use crate::verify::{check_key_accounting, Verifier};

/// Outcome of one strategy run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub strategy: StrategyKind,
    pub timings: PhaseTimings,
    /// Group removed by the invalidation phase
    pub invalidated_group: u32,
    pub keys_before_invalidate: u64,
    pub keys_after_invalidate: u64,
    pub unlinked: u64,
    /// Whether the probe read found a value before overwriting it.
    /// Always true in a returned report, a missing key fails verification.
    pub probe_previous_found: bool,
    /// Reads performed by fill verification
    pub fill_reads_checked: u64,
    pub memory_stats: MemoryStats,
    pub passed: bool,
    pub failures: Vec<String>,
}

impl ScenarioReport {
    /// Check timings against thresholds, recording one failure per breach
    pub fn validate(&mut self, thresholds: &ThresholdConfig) {
        self.failures = self.timings.breaches(thresholds);
        self.passed = self.failures.is_empty();
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub backend: StoreBackend,
    pub dataset: DatasetSummary,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.passed)
    }
}

/// Write the whole dataset, `batch_size` operations per round trip
pub fn fill(
    store: &mut dyn KeyValueStore,
    strategy: &dyn InvalidationStrategy,
    dataset: &Dataset,
    batch_size: usize,
) -> StoreResult<()> {
    let batch_size = batch_size.max(1);
    let mut batch: Vec<WriteOp> = Vec::with_capacity(batch_size);
    let mut batches = 0u64;

    for (group, member) in dataset.entries() {
        for op in strategy.write_ops(dataset, group, member) {
            batch.push(op);
            if batch.len() >= batch_size {
                store.apply(&batch)?;
                batch.clear();
                batches += 1;
            }
        }
    }
    if !batch.is_empty() {
        store.apply(&batch)?;
        batches += 1;
    }

    debug!(strategy = %strategy.kind(), batches, batch_size, "fill complete");
    Ok(())
}

/// Run one strategy: fill, invalidate, probe, then read memory stats.
///
/// Expects an empty store and leaves the dataset (minus the invalidated
/// group) behind; callers flush via [`run_isolated`].
pub fn run_scenario(
    store: &mut dyn KeyValueStore,
    strategy: &dyn InvalidationStrategy,
    dataset: &Dataset,
    config: &BenchConfig,
) -> BenchResult<ScenarioReport> {
    let kind = strategy.kind();
    let targets = config.targets();
    let verifier = Verifier::new(
        strategy,
        dataset,
        targets,
        config.scenario.verify,
        config.scenario.sample_stride,
    );

    info!(
        strategy = %kind,
        groups = dataset.groups(),
        members = dataset.members_per_group(),
        batch_size = config.scenario.fill_batch_size,
        "Filling store"
    );
    let (filled, fill_time) =
        measure(|| fill(store, strategy, dataset, config.scenario.fill_batch_size));
    filled?;
    let fill_reads_checked = verifier.check_fill(store)?;
    info!(strategy = %kind, fill_ms = fill_time.as_millis() as u64, "Fill done");

    let keys_before_invalidate = store.dbsize()?;
    let (unlinked, invalidate_time) =
        measure(|| strategy.invalidate(store, targets.invalidate_group));
    let unlinked = unlinked?;
    let keys_after_invalidate = store.dbsize()?;
    info!(
        strategy = %kind,
        group = targets.invalidate_group,
        unlinked,
        invalidate_us = invalidate_time.as_micros() as u64,
        "Group invalidated"
    );

    check_key_accounting(
        kind,
        dataset.members_per_group(),
        keys_before_invalidate,
        keys_after_invalidate,
        unlinked,
    )?;
    verifier.check_invalidation(store)?;

    let new_value = dataset.rewritten_payload(targets.probe_member);
    let (previous, probe_time) = measure(|| {
        strategy.probe(
            store,
            targets.probe_group,
            targets.probe_member,
            &new_value,
        )
    });
    let previous = previous?;
    verifier.check_probe(store, previous.as_deref(), &new_value)?;
    info!(
        strategy = %kind,
        group = targets.probe_group,
        member = targets.probe_member,
        probe_ns = probe_time.as_nanos() as u64,
        "Probe done"
    );

    let memory_stats = store.memory_stats()?;
    debug!(strategy = %kind, stats = %memory_stats, "Memory stats");

    Ok(ScenarioReport {
        strategy: kind,
        timings: PhaseTimings {
            fill: fill_time,
            invalidate: invalidate_time,
            probe: probe_time,
        },
        invalidated_group: targets.invalidate_group,
        keys_before_invalidate,
        keys_after_invalidate,
        unlinked,
        probe_previous_found: previous.is_some(),
        fill_reads_checked,
        memory_stats,
        passed: true,
        failures: Vec::new(),
    })
}

/// Run every configured strategy in order, flushing the store after each
pub fn run_suite(store: &mut dyn KeyValueStore, config: &BenchConfig) -> BenchResult<SuiteReport> {
    config.validate()?;
    let started_at = Utc::now();
    let dataset = Dataset::from_config(&config.dataset);

    prepare_store(store, config.store.flush_before_run)?;

    let mut scenarios = Vec::with_capacity(config.scenario.strategies.len());
    for kind in &config.scenario.strategies {
        let strategy = kind.build(config.scenario.scan_mode, config.scenario.scan_count);
        let mut report = run_isolated(store, |s| {
            run_scenario(s, strategy.as_ref(), &dataset, config)
        })?;
        report.validate(&config.thresholds);
        info!(strategy = %kind, passed = report.passed, "Scenario finished");
        scenarios.push(report);
    }

    Ok(SuiteReport {
        started_at,
        backend: store.backend(),
        dataset: dataset.summary(),
        scenarios,
    })
}
