//! Read-back correctness checks between the timed phases
//!
//! None of these reads are timed. Any mismatch aborts the scenario with
//! `BenchError::Verification`.

use tracing::debug;

use keyspace_common::KeyValueStore;

use crate::config::{Targets, VerifyMode};
use crate::dataset::Dataset;
use crate::error::{BenchError, BenchResult};
use crate::strategy::{InvalidationStrategy, StrategyKind};

/// Checks for one strategy over one dataset
pub struct Verifier<'a> {
    strategy: &'a dyn InvalidationStrategy,
    dataset: &'a Dataset,
    targets: Targets,
    mode: VerifyMode,
    stride: u32,
}

impl<'a> Verifier<'a> {
    pub fn new(
        strategy: &'a dyn InvalidationStrategy,
        dataset: &'a Dataset,
        targets: Targets,
        mode: VerifyMode,
        stride: u32,
    ) -> Self {
        Self {
            strategy,
            dataset,
            targets,
            mode,
            stride: stride.max(1),
        }
    }

    /// Every written (group, member) reads back its payload.
    /// Returns the number of reads performed.
    pub fn check_fill(&self, store: &mut dyn KeyValueStore) -> BenchResult<u64> {
        let mut checked = 0;
        match self.mode {
            VerifyMode::Off => {}
            VerifyMode::Full => {
                for (group, member) in self.dataset.entries() {
                    self.expect_payload(store, group, member)?;
                    checked += 1;
                }
            }
            VerifyMode::Sample => {
                for group in self.sample_groups() {
                    for member in self.sample_members() {
                        self.expect_payload(store, group, member)?;
                        checked += 1;
                    }
                }
            }
        }
        debug!(strategy = %self.strategy.kind(), checked, "fill verified");
        Ok(checked)
    }

    /// Nothing of the invalidated group is left and the other groups are intact
    pub fn check_invalidation(&self, store: &mut dyn KeyValueStore) -> BenchResult<()> {
        let group = self.targets.invalidate_group;
        let residue = self.strategy.group_residue(store, self.dataset, group)?;
        if residue != 0 {
            return Err(BenchError::verification(format!(
                "{}: {} keys of invalidated group {} still present",
                self.strategy.kind(),
                residue,
                group
            )));
        }

        for member in self.sample_members() {
            if let Some(value) = self.strategy.read(store, group, member)? {
                return Err(BenchError::verification(format!(
                    "{}: group {} member {} still readable after invalidation ({} bytes)",
                    self.strategy.kind(),
                    group,
                    member,
                    value.len()
                )));
            }
        }

        match self.mode {
            VerifyMode::Off => {}
            VerifyMode::Full => {
                for (g, member) in self.dataset.entries() {
                    if g != group {
                        self.expect_payload(store, g, member)?;
                    }
                }
            }
            VerifyMode::Sample => {
                let neighbour = if group > 1 { group - 1 } else { group + 1 };
                for member in self.dataset.members() {
                    self.expect_payload(store, neighbour, member)?;
                }
            }
        }
        Ok(())
    }

    /// The rewrite target held its filled payload before the rewrite and
    /// holds the written value after it
    pub fn check_probe(
        &self,
        store: &mut dyn KeyValueStore,
        previous: Option<&str>,
        expected: &str,
    ) -> BenchResult<()> {
        let Targets {
            probe_group,
            probe_member,
            ..
        } = self.targets;
        let filled = self.dataset.payload(probe_member);
        match previous {
            Some(value) if value == filled => {}
            Some(_) => {
                return Err(BenchError::verification(format!(
                    "{}: rewrite target (group {}, member {}) held a different payload before the rewrite",
                    self.strategy.kind(),
                    probe_group,
                    probe_member
                )))
            }
            None => {
                return Err(BenchError::verification(format!(
                    "{}: rewrite target (group {}, member {}) was missing before the rewrite",
                    self.strategy.kind(),
                    probe_group,
                    probe_member
                )))
            }
        }

        let actual = self.strategy.read(store, probe_group, probe_member)?;
        if actual.as_deref() != Some(expected) {
            return Err(BenchError::verification(format!(
                "{}: probe key (group {}, member {}) did not keep the written value",
                self.strategy.kind(),
                probe_group,
                probe_member
            )));
        }
        Ok(())
    }

    fn expect_payload(
        &self,
        store: &mut dyn KeyValueStore,
        group: u32,
        member: u32,
    ) -> BenchResult<()> {
        let expected = self.dataset.payload(member);
        match self.strategy.read(store, group, member)? {
            Some(actual) if actual == expected => Ok(()),
            Some(_) => Err(BenchError::verification(format!(
                "{}: group {} member {} holds a different payload",
                self.strategy.kind(),
                group,
                member
            ))),
            None => Err(BenchError::verification(format!(
                "{}: group {} member {} is missing",
                self.strategy.kind(),
                group,
                member
            ))),
        }
    }

    /// Every stride-th group, plus the two target groups
    fn sample_groups(&self) -> Vec<u32> {
        let mut groups: Vec<u32> = (1..=self.dataset.groups())
            .step_by(self.stride as usize)
            .collect();
        groups.push(self.targets.invalidate_group);
        groups.push(self.targets.probe_group);
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    /// First, last and probe member
    fn sample_members(&self) -> Vec<u32> {
        let mut members = vec![1, self.dataset.members_per_group(), self.targets.probe_member];
        members.sort_unstable();
        members.dedup();
        members
    }
}

/// The drop in key count matches what was unlinked and what the strategy
/// should unlink for one group
pub fn check_key_accounting(
    kind: StrategyKind,
    members_per_group: u32,
    keys_before: u64,
    keys_after: u64,
    unlinked: u64,
) -> BenchResult<()> {
    let removed = keys_before.saturating_sub(keys_after);
    if removed != unlinked {
        return Err(BenchError::verification(format!(
            "{}: key count dropped by {} but {} keys were unlinked",
            kind, removed, unlinked
        )));
    }

    let expected = kind.expected_unlinked(members_per_group);
    if unlinked != expected {
        return Err(BenchError::verification(format!(
            "{}: unlinked {} keys, expected {}",
            kind, unlinked, expected
        )));
    }
    Ok(())
}
