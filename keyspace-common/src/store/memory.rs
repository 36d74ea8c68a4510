use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::pattern::glob_match;
use super::scan::scan_all;
use super::stats::{names, MemoryStats, StatValue};
use super::{KeyValueStore, StoreBackend, WriteOp};
use crate::error::{StoreError, StoreResult};

/// Per-key bookkeeping bytes charged by the synthetic memory stats
const KEY_OVERHEAD_BYTES: u64 = 56;
/// Per-field / per-member bookkeeping bytes inside a hash or set
const ELEMENT_OVERHEAD_BYTES: u64 = 24;

#[derive(Debug, Clone)]
enum Entry {
    Str(String),
    Hash(HashMap<String, String>),
    Set(HashSet<String>),
}

impl Entry {
    fn payload_bytes(&self) -> u64 {
        match self {
            Entry::Str(value) => value.len() as u64,
            Entry::Hash(fields) => fields.iter().map(|(f, v)| field_bytes(f, v)).sum(),
            Entry::Set(members) => members.iter().map(|m| member_bytes(m)).sum(),
        }
    }
}

fn key_bytes(key: &str) -> u64 {
    key.len() as u64 + KEY_OVERHEAD_BYTES
}

fn field_bytes(field: &str, value: &str) -> u64 {
    (field.len() + value.len()) as u64 + ELEMENT_OVERHEAD_BYTES
}

fn member_bytes(member: &str) -> u64 {
    member.len() as u64 + ELEMENT_OVERHEAD_BYTES
}

/// In-process store with Redis command semantics.
///
/// Type checks follow Redis: string commands on a hash or set key fail with
/// WRONGTYPE, and so on. `MEMORY STATS` is synthesized from key and value
/// sizes, so figures are comparable between strategies but not with Redis.
/// Allocated bytes are kept as a running total updated on every write.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: HashMap<String, Entry>,
    allocated: u64,
    peak_allocated: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocated bytes minus per-key overhead
    fn dataset_bytes(&self) -> u64 {
        self.allocated - self.data.len() as u64 * KEY_OVERHEAD_BYTES
    }

    fn grow(&mut self, added: u64, removed: u64) {
        self.allocated = self.allocated + added - removed;
        self.peak_allocated = self.peak_allocated.max(self.allocated);
    }

    fn write_str(&mut self, key: &str, value: &str) {
        let removed = self
            .data
            .insert(key.to_string(), Entry::Str(value.to_string()))
            .map(|old| key_bytes(key) + old.payload_bytes())
            .unwrap_or(0);
        self.grow(key_bytes(key) + value.len() as u64, removed);
    }

    fn write_field(&mut self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let created = !self.data.contains_key(key);
        let fields = match self
            .data
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(HashMap::new()))
        {
            Entry::Hash(fields) => fields,
            _ => return Err(StoreError::wrong_type(key)),
        };
        let removed = fields
            .insert(field.to_string(), value.to_string())
            .map(|old| field_bytes(field, &old))
            .unwrap_or(0);

        let mut added = field_bytes(field, value);
        if created {
            added += key_bytes(key);
        }
        self.grow(added, removed);
        Ok(())
    }

    fn add_member(&mut self, key: &str, member: &str) -> StoreResult<()> {
        let created = !self.data.contains_key(key);
        let members = match self
            .data
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(HashSet::new()))
        {
            Entry::Set(members) => members,
            _ => return Err(StoreError::wrong_type(key)),
        };
        let inserted = members.insert(member.to_string());

        let mut added = if inserted { member_bytes(member) } else { 0 };
        if created {
            added += key_bytes(key);
        }
        self.grow(added, 0);
        Ok(())
    }

    fn apply_one(&mut self, op: &WriteOp) -> StoreResult<()> {
        match op {
            WriteOp::Set { key, value } => {
                self.write_str(key, value);
                Ok(())
            }
            WriteOp::HSet { key, field, value } => self.write_field(key, field, value),
            WriteOp::SAdd { key, member } => self.add_member(key, member),
        }
    }
}

impl KeyValueStore for InMemoryStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Memory
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.write_str(key, value);
        Ok(())
    }

    fn get(&mut self, key: &str) -> StoreResult<Option<String>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(Entry::Str(value)) => Ok(Some(value.clone())),
            Some(_) => Err(StoreError::wrong_type(key)),
        }
    }

    fn hset(&mut self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        self.write_field(key, field, value)
    }

    fn hget(&mut self, key: &str, field: &str) -> StoreResult<Option<String>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(Entry::Hash(fields)) => Ok(fields.get(field).cloned()),
            Some(_) => Err(StoreError::wrong_type(key)),
        }
    }

    fn sadd(&mut self, key: &str, member: &str) -> StoreResult<()> {
        self.add_member(key, member)
    }

    fn smembers(&mut self, key: &str) -> StoreResult<Vec<String>> {
        match self.data.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Set(members)) => Ok(members.iter().cloned().collect()),
            Some(_) => Err(StoreError::wrong_type(key)),
        }
    }

    fn keys(&mut self, pattern: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .data
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect())
    }

    /// Walks a sorted snapshot of the keyspace, examining `count` keys per
    /// step the way SCAN's COUNT hint bounds the work of one call
    fn scan_match(&mut self, pattern: &str, count: usize) -> StoreResult<Vec<String>> {
        let mut snapshot: Vec<&String> = self.data.keys().collect();
        snapshot.sort_unstable();
        let count = count.max(1);
        let mut steps = 0u64;

        let keys = scan_all(|cursor| {
            steps += 1;
            let start = cursor as usize;
            let end = (start + count).min(snapshot.len());
            let batch = snapshot[start..end]
                .iter()
                .filter(|key| glob_match(pattern, key.as_str()))
                .map(|key| key.to_string())
                .collect();
            let next = if end >= snapshot.len() { 0 } else { end as u64 };
            Ok((next, batch))
        })?;

        debug!(pattern, count, steps, matched = keys.len(), "in-memory scan");
        Ok(keys)
    }

    fn unlink(&mut self, keys: &[String]) -> StoreResult<u64> {
        let mut removed = 0;
        for key in keys {
            if let Some(entry) = self.data.remove(key.as_str()) {
                self.allocated -= key_bytes(key) + entry.payload_bytes();
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn exists(&mut self, key: &str) -> StoreResult<bool> {
        Ok(self.data.contains_key(key))
    }

    fn dbsize(&mut self) -> StoreResult<u64> {
        Ok(self.data.len() as u64)
    }

    fn flush_all(&mut self) -> StoreResult<()> {
        self.data.clear();
        self.allocated = 0;
        Ok(())
    }

    fn memory_stats(&mut self) -> StoreResult<MemoryStats> {
        let keys = self.data.len() as u64;
        let allocated = self.allocated;
        let dataset = self.dataset_bytes();
        let bytes_per_key = if keys == 0 { 0 } else { allocated / keys };

        Ok(MemoryStats::new(vec![
            (
                names::PEAK_ALLOCATED.to_string(),
                StatValue::Int(self.peak_allocated as i64),
            ),
            (
                names::TOTAL_ALLOCATED.to_string(),
                StatValue::Int(allocated as i64),
            ),
            (
                names::OVERHEAD_TOTAL.to_string(),
                StatValue::Int((allocated - dataset) as i64),
            ),
            (names::KEYS_COUNT.to_string(), StatValue::Int(keys as i64)),
            (
                names::BYTES_PER_KEY.to_string(),
                StatValue::Int(bytes_per_key as i64),
            ),
            (names::DATASET_BYTES.to_string(), StatValue::Int(dataset as i64)),
            (names::FRAGMENTATION.to_string(), StatValue::Float(1.0)),
        ]))
    }

    fn apply(&mut self, ops: &[WriteOp]) -> StoreResult<()> {
        for op in ops {
            self.apply_one(op)?;
        }
        Ok(())
    }
}
