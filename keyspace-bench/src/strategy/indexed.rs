use tracing::debug;

use keyspace_common::{KeyValueStore, StoreResult, WriteOp};

use super::{InvalidationStrategy, StrategyKind};
use crate::dataset::Dataset;
use crate::keys::{index_set_key, indexed_key};

/// One string key per member plus a per-group set naming those keys
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexedStrategy;

impl InvalidationStrategy for IndexedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Indexed
    }

    fn write_ops(&self, dataset: &Dataset, group: u32, member: u32) -> Vec<WriteOp> {
        let key = indexed_key(group, member);
        vec![
            WriteOp::Set {
                key: key.clone(),
                value: dataset.payload(member),
            },
            WriteOp::SAdd {
                key: index_set_key(group),
                member: key,
            },
        ]
    }

    fn invalidate(&self, store: &mut dyn KeyValueStore, group: u32) -> StoreResult<u64> {
        let index = index_set_key(group);
        let mut keys = store.smembers(&index)?;
        debug!(group, indexed = keys.len(), "indexed invalidate");
        keys.push(index);
        store.unlink(&keys)
    }

    fn read(
        &self,
        store: &mut dyn KeyValueStore,
        group: u32,
        member: u32,
    ) -> StoreResult<Option<String>> {
        store.get(&indexed_key(group, member))
    }

    fn probe(
        &self,
        store: &mut dyn KeyValueStore,
        group: u32,
        member: u32,
        value: &str,
    ) -> StoreResult<Option<String>> {
        let key = indexed_key(group, member);
        let previous = store.get(&key)?;
        store.set(&key, value)?;
        // Writes always maintain the index; SADD of a present member is a no-op
        store.sadd(&index_set_key(group), &key)?;
        Ok(previous)
    }

    fn group_residue(
        &self,
        store: &mut dyn KeyValueStore,
        dataset: &Dataset,
        group: u32,
    ) -> StoreResult<u64> {
        // The index may be gone, so check every key the group could own
        let mut residue = store.exists(&index_set_key(group))? as u64;
        for member in dataset.members() {
            residue += store.exists(&indexed_key(group, member))? as u64;
        }
        Ok(residue)
    }
}
