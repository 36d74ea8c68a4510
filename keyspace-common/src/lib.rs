// keyspace-common: store client abstraction shared by the keyspace benchmarks
// Used by keyspace-bench (harness, CLI, tests and criterion bench)

pub mod error;
pub mod logging;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{
    open_store, InMemoryStore, KeyValueStore, MemoryStats, RedisStore, StatValue, StoreBackend,
    WriteOp,
};
