//! Store-reported memory statistics.
//!
//! [`MemoryStats`] keeps the entries in the order the store returned them
//! (`MEMORY STATS` on Redis). Values pass through untouched; the accessors
//! only pick out the figures the benchmark report highlights.

use serde::Serialize;
use std::fmt;

/// Entry names used by `MEMORY STATS`
pub mod names {
    pub const TOTAL_ALLOCATED: &str = "total.allocated";
    pub const PEAK_ALLOCATED: &str = "peak.allocated";
    pub const DATASET_BYTES: &str = "dataset.bytes";
    pub const OVERHEAD_TOTAL: &str = "overhead.total";
    pub const FRAGMENTATION: &str = "fragmentation";
    pub const BYTES_PER_KEY: &str = "keys.bytes-per-key";
    pub const KEYS_COUNT: &str = "keys.count";
}

/// One statistic value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Text(String),
    Nested(Vec<(String, StatValue)>),
}

impl StatValue {
    /// Interpret a textual reply the way Redis encodes numbers in RESP2
    pub fn from_text(text: &str) -> Self {
        if let Ok(n) = text.parse::<i64>() {
            StatValue::Int(n)
        } else if let Ok(f) = text.parse::<f64>() {
            StatValue::Float(f)
        } else {
            StatValue::Text(text.to_string())
        }
    }

    /// Numeric value, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Int(n) => Some(*n as f64),
            StatValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Non-negative integer value, if this is one
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            StatValue::Int(n) if *n >= 0 => Some(*n as u64),
            StatValue::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as u64),
            _ => None,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Int(n) => write!(f, "{}", n),
            StatValue::Float(x) => write!(f, "{}", x),
            StatValue::Text(s) => write!(f, "{}", s),
            StatValue::Nested(entries) => {
                write!(f, "{{")?;
                for (i, (name, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Memory statistics as reported by the store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MemoryStats {
    entries: Vec<(String, StatValue)>,
}

impl MemoryStats {
    pub fn new(entries: Vec<(String, StatValue)>) -> Self {
        Self { entries }
    }

    /// All entries in store order
    pub fn entries(&self) -> &[(String, StatValue)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a top-level entry by name
    pub fn get(&self, name: &str) -> Option<&StatValue> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    /// Bytes currently allocated by the store
    pub fn total_allocated(&self) -> Option<u64> {
        self.get(names::TOTAL_ALLOCATED).and_then(StatValue::as_u64)
    }

    /// Peak bytes allocated
    pub fn peak_allocated(&self) -> Option<u64> {
        self.get(names::PEAK_ALLOCATED).and_then(StatValue::as_u64)
    }

    /// Bytes used by the dataset itself (allocated minus overhead)
    pub fn dataset_bytes(&self) -> Option<u64> {
        self.get(names::DATASET_BYTES).and_then(StatValue::as_u64)
    }

    /// Allocator fragmentation ratio
    pub fn fragmentation_ratio(&self) -> Option<f64> {
        self.get(names::FRAGMENTATION).and_then(StatValue::as_f64)
    }

    /// Average bytes per key
    pub fn bytes_per_key(&self) -> Option<u64> {
        self.get(names::BYTES_PER_KEY).and_then(StatValue::as_u64)
    }

    /// Number of keys
    pub fn keys_count(&self) -> Option<u64> {
        self.get(names::KEYS_COUNT).and_then(StatValue::as_u64)
    }
}

impl fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", StatValue::Nested(self.entries.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryStats {
        MemoryStats::new(vec![
            ("peak.allocated".to_string(), StatValue::Int(1_520_703_048)),
            ("total.allocated".to_string(), StatValue::Int(1_376_042_720)),
            ("keys.count".to_string(), StatValue::Int(999)),
            ("keys.bytes-per-key".to_string(), StatValue::Int(1_376_607)),
            (
                "db.0".to_string(),
                StatValue::Nested(vec![(
                    "overhead.hashtable.main".to_string(),
                    StatValue::Int(48_152),
                )]),
            ),
            ("fragmentation".to_string(), StatValue::Float(1.0184)),
        ])
    }

    #[test]
    fn test_accessors() {
        let stats = sample();
        assert_eq!(stats.total_allocated(), Some(1_376_042_720));
        assert_eq!(stats.peak_allocated(), Some(1_520_703_048));
        assert_eq!(stats.keys_count(), Some(999));
        assert_eq!(stats.bytes_per_key(), Some(1_376_607));
        assert_eq!(stats.fragmentation_ratio(), Some(1.0184));
        assert_eq!(stats.dataset_bytes(), None);
    }

    #[test]
    fn test_from_text() {
        assert_eq!(StatValue::from_text("42"), StatValue::Int(42));
        assert_eq!(StatValue::from_text("1.5"), StatValue::Float(1.5));
        assert_eq!(
            StatValue::from_text("jemalloc"),
            StatValue::Text("jemalloc".to_string())
        );
    }

    #[test]
    fn test_display_keeps_store_order() {
        let rendered = sample().to_string();
        assert!(rendered.starts_with("{peak.allocated: 1520703048, total.allocated"));
        assert!(rendered.contains("db.0: {overhead.hashtable.main: 48152}"));
    }

    #[test]
    fn test_serialize_as_ordered_pairs() {
        let stats = MemoryStats::new(vec![
            ("keys.count".to_string(), StatValue::Int(3)),
            ("fragmentation".to_string(), StatValue::Float(1.25)),
        ]);
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, r#"[["keys.count",3],["fragmentation",1.25]]"#);
    }
}
