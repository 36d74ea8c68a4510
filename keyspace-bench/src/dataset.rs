//! Deterministic dataset generator
//!
//! Every payload is the filler text followed by the member id, so values are
//! a few hundred bytes each and reproducible without any randomness.

use serde::Serialize;

use crate::config::DatasetConfig;

/// Filler text that makes payloads realistic in size for memory measurement
pub const LOREM_FILLER: &str = "Lorem Ipsum is simply dummy text of the printing and typesetting \
industry. Lorem Ipsum has been the industry's standard dummy text ever since the 1500s, when an \
unknown printer took a galley of type and scrambled it to make a type specimen book. It has \
survived not only five centuries, but also the leap into electronic typesetting, remaining \
essentially unchanged. It was popularised in the 1960s with the release of Letraset sheets \
containing Lorem Ipsum passages, and more recently with desktop publishing software like Aldus \
PageMaker including versions of Lorem Ipsum.";

/// The synthetic groups x members dataset
#[derive(Debug, Clone)]
pub struct Dataset {
    groups: u32,
    members_per_group: u32,
    filler: String,
}

/// Size summary carried into reports
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub groups: u32,
    pub members_per_group: u32,
    pub entries: u64,
    pub payload_bytes: u64,
}

impl Dataset {
    pub fn new(groups: u32, members_per_group: u32, filler: impl Into<String>) -> Self {
        Self {
            groups,
            members_per_group,
            filler: filler.into(),
        }
    }

    pub fn from_config(config: &DatasetConfig) -> Self {
        Self::new(config.groups, config.members_per_group, config.filler.clone())
    }

    pub fn groups(&self) -> u32 {
        self.groups
    }

    pub fn members_per_group(&self) -> u32 {
        self.members_per_group
    }

    /// Payload written for `member` during fill
    pub fn payload(&self, member: u32) -> String {
        format!("{} {}", self.filler, member)
    }

    /// Payload written by the read-modify-write probe
    pub fn rewritten_payload(&self, member: u32) -> String {
        format!("{} {} rewritten", self.filler, member)
    }

    /// All (group, member) pairs, group-major
    pub fn entries(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (1..=self.groups).flat_map(move |g| (1..=self.members_per_group).map(move |m| (g, m)))
    }

    /// Member ids of one group
    pub fn members(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.members_per_group
    }

    pub fn entry_count(&self) -> u64 {
        self.groups as u64 * self.members_per_group as u64
    }

    /// Sum of all payload lengths
    pub fn payload_bytes(&self) -> u64 {
        let per_group: u64 = self.members().map(|m| self.payload(m).len() as u64).sum();
        per_group * self.groups as u64
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            groups: self.groups,
            members_per_group: self.members_per_group,
            entries: self.entry_count(),
            payload_bytes: self.payload_bytes(),
        }
    }
}
