//! Change summary between two knowledge bases.

use serde::Serialize;

use super::types::{Fact, KnowledgeBase};

/// What changed from one knowledge base to another, keyed by fact number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KnowledgeBaseDiff {
    /// Facts whose number did not exist before.
    pub added: Vec<Fact>,
    /// Facts whose description or validation date changed (new values).
    pub updated: Vec<Fact>,
    /// Numbers that no longer appear.
    pub removed: Vec<u32>,
}

impl KnowledgeBaseDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

impl std::fmt::Display for KnowledgeBaseDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} added, {} updated, {} removed",
            self.added.len(),
            self.updated.len(),
            self.removed.len()
        )
    }
}

impl KnowledgeBase {
    /// Compare `self` (before) against `updated` (after).
    pub fn diff(&self, updated: &KnowledgeBase) -> KnowledgeBaseDiff {
        let mut diff = KnowledgeBaseDiff::default();
        for fact in &updated.facts {
            match self.get(fact.number) {
                None => diff.added.push(fact.clone()),
                Some(old) if old != fact => diff.updated.push(fact.clone()),
                Some(_) => {}
            }
        }
        diff.removed = self
            .facts
            .iter()
            .filter(|f| updated.get(f.number).is_none())
            .map(|f| f.number)
            .collect();
        diff
    }
}
