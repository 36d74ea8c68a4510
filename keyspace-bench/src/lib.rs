//! Keyspace Invalidation Benchmark
//!
//! Measures three ways of laying out grouped data in a key-value store and
//! removing one whole group at once:
//!
//! ```text
//! fill (N groups x M members) → invalidate one group → probe one live key → memory stats
//! ```
//!
//! ## Components
//!
//! - **config**: TOML configuration and presets (dataset shape, store, scenario, thresholds)
//! - **dataset**: Deterministic payload generator
//! - **keys**: Key naming for every strategy
//! - **strategy**: Flat, hashed and indexed layouts with their invalidation patterns
//! - **scenario**: Runs one strategy through the timed phases; runs the whole suite
//! - **verify**: Untimed read-back checks between phases
//! - **fixture**: Empty-store precondition and flush after every scenario
//! - **timing**: `measure` and per-phase durations
//! - **report**: Formatted report generation
//! - **cli**: `run` and `stats` subcommands
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keyspace_bench::{
//!     config::BenchConfig,
//!     report::{generate_report, ReportFormat},
//!     scenario::run_suite,
//! };
//! use keyspace_common::open_store;
//!
//! let config = BenchConfig::lite();
//! let mut store = open_store(config.store.backend, &config.store.url)?;
//! let report = run_suite(store.as_mut(), &config)?;
//! println!("{}", generate_report(&report, ReportFormat::Pretty));
//! ```
//!
//! ## Presets
//!
//! | Preset    | Dataset      | Backend | Verification |
//! |-----------|--------------|---------|--------------|
//! | lite      | 10 x 100     | memory  | full |
//! | default   | 100 x 500    | redis   | sample |
//! | reference | 1000 x 2000  | redis   | sample, every 100th group |

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fixture;
pub mod keys;
pub mod report;
pub mod scenario;
pub mod strategy;
pub mod timing;
pub mod verify;

pub use config::{BenchConfig, ConfigError, VerifyMode};
pub use dataset::Dataset;
pub use error::{BenchError, BenchResult};
pub use scenario::{run_scenario, run_suite, ScenarioReport, SuiteReport};
pub use strategy::{InvalidationStrategy, ScanMode, StrategyKind};
