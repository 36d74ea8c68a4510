//! Key-value store client abstraction.
//!
//! The benchmarks talk to the store only through [`KeyValueStore`], passed
//! explicitly as `&mut dyn KeyValueStore`. Two backends exist:
//!
//! - [`RedisStore`]: a blocking Redis connection
//! - [`InMemoryStore`]: a single-process map with Redis semantics, for tests
//!   and for runs without a server

mod memory;
mod pattern;
mod redis_store;
mod scan;
pub mod stats;

pub use memory::InMemoryStore;
pub use pattern::glob_match;
pub use redis_store::RedisStore;
pub use stats::{MemoryStats, StatValue};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreResult;

/// Which store implementation is behind a [`KeyValueStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Redis => write!(f, "redis"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// A single write, batched by [`KeyValueStore::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// SET key value
    Set { key: String, value: String },
    /// HSET key field value
    HSet {
        key: String,
        field: String,
        value: String,
    },
    /// SADD key member
    SAdd { key: String, member: String },
}

impl WriteOp {
    /// The key this operation writes to
    pub fn key(&self) -> &str {
        match self {
            WriteOp::Set { key, .. } | WriteOp::HSet { key, .. } | WriteOp::SAdd { key, .. } => {
                key
            }
        }
    }
}

/// Blocking key-value store interface.
///
/// Methods take `&mut self`: a store handle is a single connection used
/// serially by one scenario at a time.
pub trait KeyValueStore: Send {
    /// Backend behind this handle
    fn backend(&self) -> StoreBackend;

    /// SET a string key
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// GET a string key
    fn get(&mut self, key: &str) -> StoreResult<Option<String>>;

    /// HSET one field of a hash
    fn hset(&mut self, key: &str, field: &str, value: &str) -> StoreResult<()>;

    /// HGET one field of a hash
    fn hget(&mut self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// SADD one member to a set
    fn sadd(&mut self, key: &str, member: &str) -> StoreResult<()>;

    /// SMEMBERS of a set (empty when the key is missing)
    fn smembers(&mut self, key: &str) -> StoreResult<Vec<String>>;

    /// KEYS matching a glob pattern, in one blocking call
    fn keys(&mut self, pattern: &str) -> StoreResult<Vec<String>>;

    /// Keys matching a glob pattern, collected over a full SCAN cursor walk.
    ///
    /// `count` is the per-call work hint. The result holds no duplicates.
    fn scan_match(&mut self, pattern: &str, count: usize) -> StoreResult<Vec<String>>;

    /// UNLINK keys, returning how many existed. An empty slice is a no-op.
    fn unlink(&mut self, keys: &[String]) -> StoreResult<u64>;

    /// EXISTS for one key
    fn exists(&mut self, key: &str) -> StoreResult<bool>;

    /// Number of keys in the current database
    fn dbsize(&mut self) -> StoreResult<u64>;

    /// Remove every key
    fn flush_all(&mut self) -> StoreResult<()>;

    /// Store-reported memory statistics
    fn memory_stats(&mut self) -> StoreResult<MemoryStats>;

    /// Apply a batch of writes in order
    fn apply(&mut self, ops: &[WriteOp]) -> StoreResult<()>;
}

/// Open a store handle for the given backend.
///
/// `url` is only used by the Redis backend.
pub fn open_store(backend: StoreBackend, url: &str) -> StoreResult<Box<dyn KeyValueStore>> {
    match backend {
        StoreBackend::Redis => Ok(Box::new(RedisStore::connect(url)?)),
        StoreBackend::Memory => Ok(Box::new(InMemoryStore::new())),
    }
}
