//! Run command - execute the scenarios and print the report

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use keyspace_common::StoreBackend;

use crate::config::{BenchConfig, VerifyMode};
use crate::report::{generate_report, ReportFormat};
use crate::scenario::run_suite;
use crate::strategy::{ScanMode, StrategyKind};

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// TOML config file
    #[arg(long, short, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in preset (lite, default, reference)
    #[arg(long, short)]
    pub preset: Option<String>,

    /// Store backend (redis, memory)
    #[arg(long, short)]
    pub backend: Option<StoreBackend>,

    /// Redis URL, overrides REDIS_URL and the config file
    #[arg(long)]
    pub redis_url: Option<String>,

    /// Strategy to run; repeat for several (flat, hashed, indexed)
    #[arg(long, short)]
    pub strategy: Vec<StrategyKind>,

    /// Report format (pretty, simple, compact, json)
    #[arg(long, short, default_value = "pretty")]
    pub format: ReportFormat,

    /// Read-back verification (off, sample, full)
    #[arg(long)]
    pub verify: Option<VerifyMode>,

    /// How flat invalidation finds keys (keys, scan)
    #[arg(long)]
    pub scan_mode: Option<ScanMode>,

    /// Writes per round trip during fill
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Flush a non-empty store instead of refusing to run
    #[arg(long)]
    pub flush_first: bool,
}

/// Execute the run command. Returns whether every scenario passed.
pub fn execute(args: RunArgs) -> Result<bool> {
    let env_url = std::env::var("REDIS_URL").ok();
    let config = resolve_config(&args, env_url.as_deref())?;

    info!(
        backend = %config.store.backend,
        groups = config.dataset.groups,
        members = config.dataset.members_per_group,
        strategies = ?config.scenario.strategies,
        "Starting benchmark"
    );

    let mut store = super::connect(config.store.backend, &config.store.url)?;
    let report = run_suite(store.as_mut(), &config)?;

    println!("{}", generate_report(&report, args.format));
    Ok(report.passed())
}

/// Load the base config and apply command-line overrides
pub fn resolve_config(args: &RunArgs, env_url: Option<&str>) -> Result<BenchConfig> {
    let mut config = match (&args.config, &args.preset) {
        (Some(path), _) => BenchConfig::from_file(path)?,
        (None, Some(name)) => BenchConfig::preset(name)?,
        (None, None) => BenchConfig::normal(),
    };

    if let Some(backend) = args.backend {
        config.store.backend = backend;
    }
    config.store.url =
        super::resolve_redis_url(args.redis_url.as_deref(), env_url, &config.store.url);
    if !args.strategy.is_empty() {
        config.scenario.strategies = args.strategy.clone();
    }
    if let Some(verify) = args.verify {
        config.scenario.verify = verify;
    }
    if let Some(scan_mode) = args.scan_mode {
        config.scenario.scan_mode = scan_mode;
    }
    if let Some(batch_size) = args.batch_size {
        config.scenario.fill_batch_size = batch_size;
    }
    if args.flush_first {
        config.store.flush_before_run = true;
    }

    config.validate()?;
    Ok(config)
}
