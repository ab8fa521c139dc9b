//! Local overlay of intended grant changes over an authoritative baseline.
//!
//! The overlay never talks to storage. Callers read the displayed state
//! through [`StagedEdits::displayed`], compute the pending work with
//! [`changes_against`], and either commit those changes elsewhere or
//! [`StagedEdits::clear`] the overlay.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Direction of one pending change relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The key is not granted in the baseline and should become granted.
    Grant,
    /// The key is granted in the baseline and should stop being granted.
    Revoke,
}

/// One pending change produced by a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedChange<K> {
    /// Changed key.
    pub key: K,
    /// Change direction.
    pub kind: ChangeKind,
}

/// Uncommitted desired grant states keyed by `K`.
///
/// Each key appears at most once; the last write wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEdits<K: Ord> {
    edits: BTreeMap<K, bool>,
}

impl<K: Ord> Default for StagedEdits<K> {
    fn default() -> Self {
        Self {
            edits: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> StagedEdits<K> {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a desired state without comparing it to any baseline.
    pub fn stage(&mut self, key: K, desired: bool) {
        self.edits.insert(key, desired);
    }

    /// Records a desired state, dropping the entry when it matches the baseline.
    pub fn stage_against(&mut self, key: K, desired: bool, baseline: bool) {
        if desired == baseline {
            self.edits.remove(&key);
        } else {
            self.edits.insert(key, desired);
        }
    }

    /// Flips the displayed state of `key` and returns the new displayed state.
    ///
    /// Flipping back to the baseline removes the entry, so two toggles in a
    /// row restore the overlay exactly.
    pub fn toggle(&mut self, key: K, baseline: bool) -> bool {
        let desired = !self.displayed(&key, baseline);
        self.stage_against(key, desired, baseline);
        desired
    }

    /// Returns the pending state for `key`, if staged.
    #[must_use]
    pub fn pending(&self, key: &K) -> Option<bool> {
        self.edits.get(key).copied()
    }

    /// Returns the staged state when present, otherwise the baseline.
    #[must_use]
    pub fn displayed(&self, key: &K, baseline: bool) -> bool {
        self.pending(key).unwrap_or(baseline)
    }

    /// Returns whether any staged entry differs from the baseline.
    #[must_use]
    pub fn is_dirty(&self, baseline: impl Fn(&K) -> bool) -> bool {
        self.edits
            .iter()
            .any(|(key, desired)| *desired != baseline(key))
    }

    /// Returns pending changes against the baseline; see [`changes_against`].
    #[must_use]
    pub fn changes_against(&self, baseline: impl Fn(&K) -> bool) -> Vec<StagedChange<K>> {
        changes_against(&self.edits, baseline)
    }

    /// Iterates staged entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, bool)> {
        self.edits.iter().map(|(key, desired)| (key, *desired))
    }

    /// Returns the number of staged entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns whether nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Drops every staged entry.
    pub fn clear(&mut self) {
        self.edits.clear();
    }
}

impl<K: Ord> FromIterator<(K, bool)> for StagedEdits<K> {
    fn from_iter<T: IntoIterator<Item = (K, bool)>>(iter: T) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

/// Diffs desired states against the current baseline, ordered by key.
///
/// Entries equal to the baseline produce nothing.
#[must_use]
pub fn changes_against<K: Ord + Clone>(
    edits: &BTreeMap<K, bool>,
    baseline: impl Fn(&K) -> bool,
) -> Vec<StagedChange<K>> {
    edits
        .iter()
        .filter_map(|(key, desired)| match (*desired, baseline(key)) {
            (true, false) => Some(StagedChange {
                key: key.clone(),
                kind: ChangeKind::Grant,
            }),
            (false, true) => Some(StagedChange {
                key: key.clone(),
                kind: ChangeKind::Revoke,
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::{ChangeKind, StagedChange, StagedEdits};

    #[test]
    fn diff_skips_entries_equal_to_baseline() {
        let baseline = BTreeMap::from([('A', true), ('B', false), ('C', true)]);
        let edits: StagedEdits<char> = [('A', false), ('B', true), ('C', true)]
            .into_iter()
            .collect();

        let changes = edits.changes_against(|key| baseline.get(key).copied().unwrap_or(false));

        assert_eq!(
            changes,
            vec![
                StagedChange {
                    key: 'A',
                    kind: ChangeKind::Revoke,
                },
                StagedChange {
                    key: 'B',
                    kind: ChangeKind::Grant,
                },
            ]
        );
    }

    #[test]
    fn last_write_wins() {
        let mut edits = StagedEdits::new();
        edits.stage(7, true);
        edits.stage(7, false);

        assert_eq!(edits.len(), 1);
        assert_eq!(edits.pending(&7), Some(false));
    }

    #[test]
    fn toggle_back_to_baseline_clears_dirty_flag() {
        let mut edits = StagedEdits::new();
        assert!(!edits.toggle(3, true));
        assert!(edits.is_dirty(|_| true));

        assert!(edits.toggle(3, true));
        assert!(edits.is_empty());
        assert!(!edits.is_dirty(|_| true));
    }

    #[test]
    fn stale_entry_becomes_noop_after_baseline_moves() {
        let mut edits = StagedEdits::new();
        edits.toggle(1, false);

        assert!(!edits.is_dirty(|_| true));
        assert!(edits.changes_against(|_| true).is_empty());
    }

    proptest! {
        #[test]
        fn double_toggle_restores_overlay(
            seed in proptest::collection::vec((0_u8..8, any::<bool>()), 0..16),
            key in 0_u8..8,
            baseline in any::<bool>(),
        ) {
            let mut edits: StagedEdits<u8> = StagedEdits::new();
            for (seed_key, desired) in seed {
                edits.stage_against(seed_key, desired, baseline);
            }
            let before = edits.clone();

            edits.toggle(key, baseline);
            edits.toggle(key, baseline);

            prop_assert_eq!(edits, before);
        }

        #[test]
        fn diff_only_reports_real_differences(
            entries in proptest::collection::btree_map(0_u8..32, any::<bool>(), 0..32),
            granted in proptest::collection::btree_set(0_u8..32, 0..32),
        ) {
            let edits: StagedEdits<u8> = entries.clone().into_iter().collect();
            let changes = edits.changes_against(|key| granted.contains(key));

            for change in &changes {
                let desired = entries.get(&change.key).copied().unwrap_or_default();
                let current = granted.contains(&change.key);
                prop_assert_ne!(desired, current);
                prop_assert_eq!(change.kind == ChangeKind::Grant, desired);
            }

            let expected = entries
                .iter()
                .filter(|(key, desired)| **desired != granted.contains(*key))
                .count();
            prop_assert_eq!(changes.len(), expected);
        }
    }
}
