//! Group invalidation strategies
//!
//! Each strategy decides how a (group, member) payload is laid out in the
//! store and how one whole group is removed:
//!
//! | Strategy | Layout | Invalidate |
//! |----------|--------|------------|
//! | Flat     | one string key per member | pattern scan, one bulk UNLINK |
//! | Hashed   | one hash per group, member = field | one UNLINK of the hash |
//! | Indexed  | one string key per member + per-group set of key names | SMEMBERS, one bulk UNLINK |
//!
//! Pattern scans cost O(keyspace) and `KEYS` blocks the store while it runs.
//! Hashes delete in O(1) but change access from key to field. Index sets keep
//! flat keys at the cost of one extra write per insert and one extra read
//! before delete.

mod flat;
mod hashed;
mod indexed;

pub use flat::FlatStrategy;
pub use hashed::HashedStrategy;
pub use indexed::IndexedStrategy;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use keyspace_common::{KeyValueStore, StoreResult, WriteOp};

use crate::dataset::Dataset;

/// How the flat strategy finds the keys of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// One blocking KEYS call
    #[default]
    Keys,
    /// Cursor-based SCAN MATCH
    Scan,
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keys" => Ok(ScanMode::Keys),
            "scan" => Ok(ScanMode::Scan),
            other => Err(format!("unknown scan mode '{}'", other)),
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Keys => write!(f, "keys"),
            ScanMode::Scan => write!(f, "scan"),
        }
    }
}

/// The three strategies under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Flat,
    Hashed,
    Indexed,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] =
        [StrategyKind::Flat, StrategyKind::Hashed, StrategyKind::Indexed];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Flat => "flat",
            StrategyKind::Hashed => "hashed",
            StrategyKind::Indexed => "indexed",
        }
    }

    /// Build the strategy; `scan` and `scan_count` only affect Flat
    pub fn build(&self, scan: ScanMode, scan_count: usize) -> Box<dyn InvalidationStrategy> {
        match self {
            StrategyKind::Flat => Box::new(FlatStrategy::new(scan, scan_count)),
            StrategyKind::Hashed => Box::new(HashedStrategy),
            StrategyKind::Indexed => Box::new(IndexedStrategy),
        }
    }

    /// Keys a single invalidation is expected to unlink
    pub fn expected_unlinked(&self, members_per_group: u32) -> u64 {
        match self {
            StrategyKind::Flat => members_per_group as u64,
            StrategyKind::Hashed => 1,
            // Every member key plus the index set itself
            StrategyKind::Indexed => members_per_group as u64 + 1,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flat" | "naive" => Ok(StrategyKind::Flat),
            "hashed" | "hash" => Ok(StrategyKind::Hashed),
            "indexed" | "set" => Ok(StrategyKind::Indexed),
            other => Err(format!(
                "unknown strategy '{}' (expected flat, hashed or indexed)",
                other
            )),
        }
    }
}

/// A layout plus its bulk-invalidation pattern
pub trait InvalidationStrategy {
    fn kind(&self) -> StrategyKind;

    /// Writes that store one member's payload
    fn write_ops(&self, dataset: &Dataset, group: u32, member: u32) -> Vec<WriteOp>;

    /// Remove every trace of `group`, returning the number of keys unlinked
    fn invalidate(&self, store: &mut dyn KeyValueStore, group: u32) -> StoreResult<u64>;

    /// Read one member's payload
    fn read(&self, store: &mut dyn KeyValueStore, group: u32, member: u32)
        -> StoreResult<Option<String>>;

    /// Read-modify-write of one member: get, then set `value`.
    /// Returns the value read before the write.
    fn probe(
        &self,
        store: &mut dyn KeyValueStore,
        group: u32,
        member: u32,
        value: &str,
    ) -> StoreResult<Option<String>>;

    /// Number of keys belonging to `group` still present
    fn group_residue(
        &self,
        store: &mut dyn KeyValueStore,
        dataset: &Dataset,
        group: u32,
    ) -> StoreResult<u64>;
}
