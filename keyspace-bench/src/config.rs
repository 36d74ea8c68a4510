//! Configuration structs for the benchmark harness
//!
//! Controls the dataset shape, which store to run against, how each scenario
//! invalidates and probes, and the optional timing thresholds.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use keyspace_common::StoreBackend;

use crate::dataset::LOREM_FILLER;
use crate::strategy::{ScanMode, StrategyKind};

/// Default Redis URL when neither config nor `REDIS_URL` provide one
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Shape of the synthetic dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Number of groups (ids 1..=groups)
    pub groups: u32,
    /// Members per group (ids 1..=members_per_group)
    pub members_per_group: u32,
    /// Text every payload starts with
    #[serde(default = "default_filler")]
    pub filler: String,
}

fn default_filler() -> String {
    LOREM_FILLER.to_string()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            groups: 100,
            members_per_group: 500,
            filler: default_filler(),
        }
    }
}

/// Which store to run against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend (redis or memory)
    #[serde(default)]
    pub backend: StoreBackend,
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Flush a non-empty store before the first scenario instead of failing
    #[serde(default)]
    pub flush_before_run: bool,
}

fn default_redis_url() -> String {
    DEFAULT_REDIS_URL.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            url: default_redis_url(),
            flush_before_run: false,
        }
    }
}

/// How much of the dataset to read back for correctness checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// No read-back beyond the probe check
    Off,
    /// Spot checks on a stride of groups
    #[default]
    Sample,
    /// Every (group, member) pair
    Full,
}

impl std::str::FromStr for VerifyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "none" => Ok(VerifyMode::Off),
            "sample" => Ok(VerifyMode::Sample),
            "full" => Ok(VerifyMode::Full),
            other => Err(format!("unknown verify mode '{}'", other)),
        }
    }
}

/// Per-scenario behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Strategies to run, in order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,
    /// Group removed by the invalidation phase (default: last group)
    #[serde(default)]
    pub invalidate_group: Option<u32>,
    /// Group of the probed key (default: second to last group)
    #[serde(default)]
    pub probe_group: Option<u32>,
    /// Member of the probed key (default: last member)
    #[serde(default)]
    pub probe_member: Option<u32>,
    /// How the flat strategy finds a group's keys
    #[serde(default)]
    pub scan_mode: ScanMode,
    /// COUNT hint for SCAN
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,
    /// Writes per round trip during fill (1 = unbatched)
    #[serde(default = "default_fill_batch_size")]
    pub fill_batch_size: usize,
    /// Read-back verification
    #[serde(default)]
    pub verify: VerifyMode,
    /// Every n-th group is checked in sample mode
    #[serde(default = "default_sample_stride")]
    pub sample_stride: u32,
}

fn default_strategies() -> Vec<StrategyKind> {
    StrategyKind::ALL.to_vec()
}

fn default_scan_count() -> usize {
    1000
}

fn default_fill_batch_size() -> usize {
    1
}

fn default_sample_stride() -> u32 {
    10
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            invalidate_group: None,
            probe_group: None,
            probe_member: None,
            scan_mode: ScanMode::default(),
            scan_count: default_scan_count(),
            fill_batch_size: default_fill_batch_size(),
            verify: VerifyMode::default(),
            sample_stride: default_sample_stride(),
        }
    }
}

/// Optional timing limits; unset limits are only observed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Maximum fill time in milliseconds
    #[serde(default)]
    pub max_fill_ms: Option<u64>,
    /// Maximum invalidation time in milliseconds
    #[serde(default)]
    pub max_invalidate_ms: Option<u64>,
    /// Maximum probe time in microseconds
    #[serde(default)]
    pub max_probe_us: Option<u64>,
}

impl ThresholdConfig {
    pub fn is_empty(&self) -> bool {
        self.max_fill_ms.is_none() && self.max_invalidate_ms.is_none() && self.max_probe_us.is_none()
    }
}

/// Complete benchmark configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchConfig {
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
}

/// Scenario targets with defaults resolved against the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Targets {
    pub invalidate_group: u32,
    pub probe_group: u32,
    pub probe_member: u32,
}

impl BenchConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse TOML: {}", e)))
    }

    /// Resolve invalidation and probe targets
    pub fn targets(&self) -> Targets {
        let groups = self.dataset.groups;
        Targets {
            invalidate_group: self.scenario.invalidate_group.unwrap_or(groups),
            probe_group: self
                .scenario
                .probe_group
                .unwrap_or_else(|| groups.saturating_sub(1).max(1)),
            probe_member: self
                .scenario
                .probe_member
                .unwrap_or(self.dataset.members_per_group),
        }
    }

    /// Check the configuration is runnable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let groups = self.dataset.groups;
        let members = self.dataset.members_per_group;

        if groups < 2 {
            return Err(invalid(format!(
                "dataset.groups must be at least 2 (one to invalidate, one to probe), got {}",
                groups
            )));
        }
        if members < 1 {
            return Err(invalid("dataset.members_per_group must be at least 1"));
        }
        if self.scenario.strategies.is_empty() {
            return Err(invalid("scenario.strategies must name at least one strategy"));
        }
        if self.scenario.fill_batch_size == 0 {
            return Err(invalid("scenario.fill_batch_size must be at least 1"));
        }
        if self.scenario.scan_count == 0 {
            return Err(invalid("scenario.scan_count must be at least 1"));
        }
        if self.scenario.sample_stride == 0 {
            return Err(invalid("scenario.sample_stride must be at least 1"));
        }

        let targets = self.targets();
        if !(1..=groups).contains(&targets.invalidate_group) {
            return Err(invalid(format!(
                "scenario.invalidate_group {} is outside 1..={}",
                targets.invalidate_group, groups
            )));
        }
        if !(1..=groups).contains(&targets.probe_group) {
            return Err(invalid(format!(
                "scenario.probe_group {} is outside 1..={}",
                targets.probe_group, groups
            )));
        }
        if !(1..=members).contains(&targets.probe_member) {
            return Err(invalid(format!(
                "scenario.probe_member {} is outside 1..={}",
                targets.probe_member, members
            )));
        }
        if targets.probe_group == targets.invalidate_group {
            return Err(invalid(format!(
                "scenario.probe_group must differ from invalidate_group ({}), the probe needs a live key",
                targets.invalidate_group
            )));
        }

        Ok(())
    }

    /// Find a preset file, checking the usual locations
    fn find_config_file(name: &str) -> Option<PathBuf> {
        // Relative to CARGO_MANIFEST_DIR (for tests)
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let path = PathBuf::from(&manifest_dir).join("config").join(name);
            if path.exists() {
                return Some(path);
            }
        }

        let path = PathBuf::from("config").join(name);
        if path.exists() {
            return Some(path);
        }

        // When running from the workspace root
        let path = PathBuf::from("keyspace-bench/config").join(name);
        if path.exists() {
            return Some(path);
        }

        None
    }

    fn load_preset(name: &str, fallback: fn() -> Self) -> Self {
        if let Some(path) = Self::find_config_file(&format!("{}.toml", name)) {
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => tracing::warn!("Ignoring {}: {}", path.display(), e),
            }
        }
        fallback()
    }

    /// Look up a preset by name (`lite`, `default`, `reference`)
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "lite" => Ok(Self::lite()),
            "default" | "normal" => Ok(Self::normal()),
            "reference" => Ok(Self::reference()),
            other => Err(ConfigError::ValidationError(format!(
                "unknown preset '{}' (expected lite, default or reference)",
                other
            ))),
        }
    }

    /// Small in-memory run with full verification.
    /// Loads from config/lite.toml if available
    pub fn lite() -> Self {
        Self::load_preset("lite", Self::lite_defaults)
    }

    fn lite_defaults() -> Self {
        Self {
            dataset: DatasetConfig {
                groups: 10,
                members_per_group: 100,
                filler: default_filler(),
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                ..Default::default()
            },
            scenario: ScenarioConfig {
                verify: VerifyMode::Full,
                ..Default::default()
            },
            thresholds: ThresholdConfig::default(),
        }
    }

    /// Medium Redis run.
    /// Loads from config/default.toml if available
    pub fn normal() -> Self {
        Self::load_preset("default", Self::normal_defaults)
    }

    fn normal_defaults() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            store: StoreConfig::default(),
            scenario: ScenarioConfig::default(),
            thresholds: ThresholdConfig::default(),
        }
    }

    /// The full 1000 groups x 2000 members run against Redis.
    /// Loads from config/reference.toml if available
    pub fn reference() -> Self {
        Self::load_preset("reference", Self::reference_defaults)
    }

    fn reference_defaults() -> Self {
        Self {
            dataset: DatasetConfig {
                groups: 1000,
                members_per_group: 2000,
                filler: default_filler(),
            },
            store: StoreConfig::default(),
            scenario: ScenarioConfig {
                sample_stride: 100,
                ..Default::default()
            },
            thresholds: ThresholdConfig::default(),
        }
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
