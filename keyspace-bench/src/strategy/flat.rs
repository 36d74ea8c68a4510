use tracing::debug;

use keyspace_common::{KeyValueStore, StoreResult, WriteOp};

use super::{InvalidationStrategy, ScanMode, StrategyKind};
use crate::dataset::Dataset;
use crate::keys::{flat_group_pattern, flat_key};

/// One string key per member; grouping lives only in the key prefix
#[derive(Debug, Clone, Copy)]
pub struct FlatStrategy {
    scan: ScanMode,
    scan_count: usize,
}

impl FlatStrategy {
    pub fn new(scan: ScanMode, scan_count: usize) -> Self {
        Self { scan, scan_count }
    }

    fn group_keys(&self, store: &mut dyn KeyValueStore, group: u32) -> StoreResult<Vec<String>> {
        let pattern = flat_group_pattern(group);
        match self.scan {
            ScanMode::Keys => store.keys(&pattern),
            ScanMode::Scan => store.scan_match(&pattern, self.scan_count),
        }
    }
}

impl InvalidationStrategy for FlatStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Flat
    }

    fn write_ops(&self, dataset: &Dataset, group: u32, member: u32) -> Vec<WriteOp> {
        vec![WriteOp::Set {
            key: flat_key(group, member),
            value: dataset.payload(member),
        }]
    }

    fn invalidate(&self, store: &mut dyn KeyValueStore, group: u32) -> StoreResult<u64> {
        let keys = self.group_keys(store, group)?;
        debug!(group, matched = keys.len(), scan = %self.scan, "flat invalidate");
        store.unlink(&keys)
    }

    fn read(
        &self,
        store: &mut dyn KeyValueStore,
        group: u32,
        member: u32,
    ) -> StoreResult<Option<String>> {
        store.get(&flat_key(group, member))
    }

    fn probe(
        &self,
        store: &mut dyn KeyValueStore,
        group: u32,
        member: u32,
        value: &str,
    ) -> StoreResult<Option<String>> {
        let key = flat_key(group, member);
        let previous = store.get(&key)?;
        store.set(&key, value)?;
        Ok(previous)
    }

    fn group_residue(
        &self,
        store: &mut dyn KeyValueStore,
        _dataset: &Dataset,
        group: u32,
    ) -> StoreResult<u64> {
        Ok(store.keys(&flat_group_pattern(group))?.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyspace_common::InMemoryStore;

    fn filled(dataset: &Dataset, strategy: &FlatStrategy) -> InMemoryStore {
        let mut store = InMemoryStore::new();
        for (g, m) in dataset.entries() {
            store.apply(&strategy.write_ops(dataset, g, m)).unwrap();
        }
        store
    }

    #[test]
    fn test_fill_layout() {
        let dataset = Dataset::new(3, 5, "p");
        let strategy = FlatStrategy::new(ScanMode::Keys, 10);
        let mut store = filled(&dataset, &strategy);

        assert_eq!(store.dbsize().unwrap(), 15);
        assert_eq!(store.get("group_2_member_4").unwrap(), Some(dataset.payload(4)));
    }

    #[test]
    fn test_invalidate_with_both_scan_modes() {
        for scan in [ScanMode::Keys, ScanMode::Scan] {
            let dataset = Dataset::new(12, 5, "p");
            let strategy = FlatStrategy::new(scan, 3);
            let mut store = filled(&dataset, &strategy);

            // Group 1 must not take groups 10, 11 and 12 with it
            assert_eq!(strategy.invalidate(&mut store, 1).unwrap(), 5);
            assert_eq!(store.dbsize().unwrap(), 55);
            assert_eq!(strategy.group_residue(&mut store, &dataset, 1).unwrap(), 0);
            assert_eq!(strategy.group_residue(&mut store, &dataset, 10).unwrap(), 5);
        }
    }

    #[test]
    fn test_probe_returns_previous_value() {
        let dataset = Dataset::new(2, 3, "p");
        let strategy = FlatStrategy::new(ScanMode::Keys, 10);
        let mut store = filled(&dataset, &strategy);

        let previous = strategy.probe(&mut store, 1, 3, "new").unwrap();
        assert_eq!(previous, Some(dataset.payload(3)));
        assert_eq!(strategy.read(&mut store, 1, 3).unwrap().as_deref(), Some("new"));
    }
}
