//! In-memory rule store
//!
//! Holds the ordered rule list of the active project. The store does no
//! validation of its own; callers snapshot before mutating so a failed
//! save can be restored exactly.

use crate::rule::{Rule, RuleId};
use parking_lot::RwLock;
use std::sync::Arc;

/// Immutable copy of the rule list, taken for rollback
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSnapshot {
    rules: Arc<[Rule]>,
}

impl RuleSnapshot {
    /// Rules captured by the snapshot
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Owned copy of the captured rules
    #[inline]
    #[must_use]
    pub fn to_vec(&self) -> Vec<Rule> {
        self.rules.to_vec()
    }

    /// Number of captured rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the snapshot captured no rules
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Ordered rule list of one project
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: RwLock<Vec<Rule>>,
}

impl RuleStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store holding `rules`
    #[inline]
    #[must_use]
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }

    /// Copy of the current list for rollback
    #[must_use]
    pub fn snapshot(&self) -> RuleSnapshot {
        RuleSnapshot {
            rules: Arc::from(self.rules.read().as_slice()),
        }
    }

    /// Replace the whole list
    pub fn replace(&self, rules: Vec<Rule>) {
        let mut guard = self.rules.write();
        tracing::trace!(before = guard.len(), after = rules.len(), "replacing rule list");
        *guard = rules;
    }

    /// Restore a previously taken snapshot
    pub fn restore(&self, snapshot: &RuleSnapshot) {
        self.replace(snapshot.to_vec());
    }

    /// Owned copy of the current list
    #[must_use]
    pub fn rules(&self) -> Vec<Rule> {
        self.rules.read().clone()
    }

    /// Look up a rule by id
    #[must_use]
    pub fn find(&self, id: RuleId) -> Option<Rule> {
        self.rules.read().iter().find(|r| r.id == id).cloned()
    }

    /// Number of rules held
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    /// Whether the store holds no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::SampleRate;

    fn rules(ids: &[u64]) -> Vec<Rule> {
        ids.iter()
            .map(|&id| Rule::specific(id, SampleRate::ALL, vec![]))
            .collect()
    }

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let store = RuleStore::with_rules(rules(&[1, 2, 3]));
        let snapshot = store.snapshot();

        store.replace(rules(&[9]));
        assert_eq!(store.len(), 1);
        assert_eq!(snapshot.len(), 3);

        store.restore(&snapshot);
        assert_eq!(store.rules(), rules(&[1, 2, 3]));
    }

    #[test]
    fn find_by_id() {
        let store = RuleStore::with_rules(rules(&[4, 5]));
        assert_eq!(store.find(RuleId::new(5)).map(|r| r.id), Some(RuleId::new(5)));
        assert!(store.find(RuleId::new(6)).is_none());
    }

    #[test]
    fn empty_store() {
        let store = RuleStore::new();
        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());
    }
}
