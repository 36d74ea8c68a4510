use keyspace_common::{KeyValueStore, StoreResult, WriteOp};

use super::{InvalidationStrategy, StrategyKind};
use crate::dataset::Dataset;
use crate::keys::{hash_field, hash_key};

/// One hash per group, one field per member
#[derive(Debug, Clone, Copy, Default)]
pub struct HashedStrategy;

impl InvalidationStrategy for HashedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Hashed
    }

    fn write_ops(&self, dataset: &Dataset, group: u32, member: u32) -> Vec<WriteOp> {
        vec![WriteOp::HSet {
            key: hash_key(group),
            field: hash_field(member),
            value: dataset.payload(member),
        }]
    }

    fn invalidate(&self, store: &mut dyn KeyValueStore, group: u32) -> StoreResult<u64> {
        store.unlink(&[hash_key(group)])
    }

    fn read(
        &self,
        store: &mut dyn KeyValueStore,
        group: u32,
        member: u32,
    ) -> StoreResult<Option<String>> {
        store.hget(&hash_key(group), &hash_field(member))
    }

    fn probe(
        &self,
        store: &mut dyn KeyValueStore,
        group: u32,
        member: u32,
        value: &str,
    ) -> StoreResult<Option<String>> {
        let key = hash_key(group);
        let field = hash_field(member);
        let previous = store.hget(&key, &field)?;
        store.hset(&key, &field, value)?;
        Ok(previous)
    }

    fn group_residue(
        &self,
        store: &mut dyn KeyValueStore,
        _dataset: &Dataset,
        group: u32,
    ) -> StoreResult<u64> {
        Ok(store.exists(&hash_key(group))? as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyspace_common::InMemoryStore;

    #[test]
    fn test_fill_invalidate_probe() {
        let dataset = Dataset::new(3, 4, "p");
        let strategy = HashedStrategy;
        let mut store = InMemoryStore::new();
        for (g, m) in dataset.entries() {
            store.apply(&strategy.write_ops(&dataset, g, m)).unwrap();
        }

        // One key per group
        assert_eq!(store.dbsize().unwrap(), 3);
        assert_eq!(strategy.read(&mut store, 2, 4).unwrap(), Some(dataset.payload(4)));

        assert_eq!(strategy.invalidate(&mut store, 3).unwrap(), 1);
        assert_eq!(strategy.group_residue(&mut store, &dataset, 3).unwrap(), 0);
        assert_eq!(strategy.read(&mut store, 3, 1).unwrap(), None);

        let previous = strategy.probe(&mut store, 2, 4, "new").unwrap();
        assert_eq!(previous, Some(dataset.payload(4)));
        assert_eq!(strategy.read(&mut store, 2, 4).unwrap().as_deref(), Some("new"));
        assert_eq!(store.dbsize().unwrap(), 2);
    }
}
