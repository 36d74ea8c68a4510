use redis::{Client as RedisClient, Commands, Connection, Value};
use tracing::debug;

use super::scan::scan_all;
use super::stats::{MemoryStats, StatValue};
use super::{KeyValueStore, StoreBackend, WriteOp};
use crate::error::{StoreError, StoreResult};

/// Blocking Redis store over a single connection
pub struct RedisStore {
    #[allow(dead_code)] // Keep client alive to maintain connection
    client: RedisClient,
    connection: Connection,
}

impl RedisStore {
    /// Connect to Redis at `redis_url` (e.g. `redis://127.0.0.1:6379`)
    pub fn connect(redis_url: &str) -> StoreResult<Self> {
        let client = RedisClient::open(redis_url)
            .map_err(|e| StoreError::Connection(format!("Failed to create Redis client: {}", e)))?;

        let connection = client
            .get_connection()
            .map_err(|e| StoreError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        debug!("Connected to Redis at: {}", redis_url);

        Ok(Self { client, connection })
    }
}

impl KeyValueStore for RedisStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Redis
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let _: () = self.connection.set(key, value)?;
        Ok(())
    }

    fn get(&mut self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.connection.get(key)?)
    }

    fn hset(&mut self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let _: () = self.connection.hset(key, field, value)?;
        Ok(())
    }

    fn hget(&mut self, key: &str, field: &str) -> StoreResult<Option<String>> {
        Ok(self.connection.hget(key, field)?)
    }

    fn sadd(&mut self, key: &str, member: &str) -> StoreResult<()> {
        let _: () = self.connection.sadd(key, member)?;
        Ok(())
    }

    fn smembers(&mut self, key: &str) -> StoreResult<Vec<String>> {
        Ok(self.connection.smembers(key)?)
    }

    fn keys(&mut self, pattern: &str) -> StoreResult<Vec<String>> {
        Ok(self.connection.keys(pattern)?)
    }

    fn scan_match(&mut self, pattern: &str, count: usize) -> StoreResult<Vec<String>> {
        let connection = &mut self.connection;
        scan_all(|cursor| {
            Ok(redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(count)
                .query(connection)?)
        })
    }

    fn unlink(&mut self, keys: &[String]) -> StoreResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        Ok(self.connection.unlink(keys)?)
    }

    fn exists(&mut self, key: &str) -> StoreResult<bool> {
        Ok(self.connection.exists(key)?)
    }

    fn dbsize(&mut self) -> StoreResult<u64> {
        Ok(redis::cmd("DBSIZE").query(&mut self.connection)?)
    }

    fn flush_all(&mut self) -> StoreResult<()> {
        let _: () = redis::cmd("FLUSHALL").query(&mut self.connection)?;
        Ok(())
    }

    fn memory_stats(&mut self) -> StoreResult<MemoryStats> {
        let reply: Value = redis::cmd("MEMORY")
            .arg("STATS")
            .query(&mut self.connection)?;
        match stat_value(&reply) {
            Some(StatValue::Nested(entries)) => Ok(MemoryStats::new(entries)),
            _ => Err(StoreError::UnexpectedReply(format!(
                "MEMORY STATS returned {:?}",
                reply
            ))),
        }
    }

    fn apply(&mut self, ops: &[WriteOp]) -> StoreResult<()> {
        if ops.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        for op in ops {
            match op {
                WriteOp::Set { key, value } => pipe.set(key, value).ignore(),
                WriteOp::HSet { key, field, value } => pipe.hset(key, field, value).ignore(),
                WriteOp::SAdd { key, member } => pipe.sadd(key, member).ignore(),
            };
        }
        let _: () = pipe.query(&mut self.connection)?;
        Ok(())
    }
}

/// Convert a `MEMORY STATS` reply into a [`StatValue`].
///
/// RESP2 encodes the stats as a flat name/value array with floats as bulk
/// strings; RESP3 uses maps and doubles. Both shapes are accepted.
fn stat_value(value: &Value) -> Option<StatValue> {
    match value {
        Value::Int(n) => Some(StatValue::Int(*n)),
        Value::Double(f) => Some(StatValue::Float(*f)),
        Value::BulkString(bytes) => Some(StatValue::from_text(&String::from_utf8_lossy(bytes))),
        Value::SimpleString(text) => Some(StatValue::from_text(text)),
        Value::VerbatimString { text, .. } => Some(StatValue::from_text(text)),
        Value::Okay => Some(StatValue::Text("OK".to_string())),
        Value::Array(items) => nested_from_pairs(items.chunks(2).map(|pair| (&pair[0], pair.get(1)))),
        Value::Map(pairs) => nested_from_pairs(pairs.iter().map(|(k, v)| (k, Some(v)))),
        _ => None,
    }
}

fn nested_from_pairs<'a>(
    pairs: impl Iterator<Item = (&'a Value, Option<&'a Value>)>,
) -> Option<StatValue> {
    let mut entries = Vec::new();
    for (name, value) in pairs {
        let name = match stat_value(name)? {
            StatValue::Text(text) => text,
            other => other.to_string(),
        };
        // Nil values (e.g. an unset replication backlog) are reported as 0
        let value = match value? {
            Value::Nil => StatValue::Int(0),
            v => stat_value(v)?,
        };
        entries.push((name, value));
    }
    Some(StatValue::Nested(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulk(s: &str) -> Value {
        Value::BulkString(s.as_bytes().to_vec())
    }

    #[test]
    fn test_resp2_memory_stats_reply() {
        let reply = Value::Array(vec![
            bulk("peak.allocated"),
            Value::Int(1_520_703_048),
            bulk("total.allocated"),
            Value::Int(1_431_451_856),
            bulk("db.0"),
            Value::Array(vec![
                bulk("overhead.hashtable.main"),
                Value::Int(96_697_256),
                bulk("overhead.hashtable.expires"),
                Value::Int(0),
            ]),
            bulk("keys.count"),
            Value::Int(1_998_001),
            bulk("fragmentation"),
            bulk("1.0151302814483643"),
        ]);

        let Some(StatValue::Nested(entries)) = stat_value(&reply) else {
            panic!("expected nested stats");
        };
        let stats = MemoryStats::new(entries);
        assert_eq!(stats.total_allocated(), Some(1_431_451_856));
        assert_eq!(stats.keys_count(), Some(1_998_001));
        let frag = stats.fragmentation_ratio().unwrap();
        assert!((frag - 1.0151302814483643).abs() < 1e-12);
        assert!(matches!(stats.get("db.0"), Some(StatValue::Nested(inner)) if inner.len() == 2));
    }

    #[test]
    fn test_resp3_memory_stats_reply() {
        let reply = Value::Map(vec![
            (bulk("keys.count"), Value::Int(999)),
            (bulk("fragmentation"), Value::Double(1.0184)),
            (bulk("replication.backlog"), Value::Nil),
        ]);

        let Some(StatValue::Nested(entries)) = stat_value(&reply) else {
            panic!("expected nested stats");
        };
        let stats = MemoryStats::new(entries);
        assert_eq!(stats.keys_count(), Some(999));
        assert_eq!(stats.fragmentation_ratio(), Some(1.0184));
        assert_eq!(stats.get("replication.backlog"), Some(&StatValue::Int(0)));
    }

    #[test]
    fn test_odd_length_array_is_rejected() {
        let reply = Value::Array(vec![bulk("keys.count")]);
        assert_eq!(stat_value(&reply), None);
    }
}
