//! Core knowledge type definitions.
//!
//! Defines [`Fact`] (one dated statement), [`KnowledgeBase`] (a titled set of
//! facts with unique numbers) and [`SlackMessage`] (the incoming update that
//! the pipeline merges into the knowledge base).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single, standalone, dated statement in the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// Positive identifier. Gaps left by deletions are permanent and never renumbered.
    pub number: u32,
    /// The statement itself, trimmed and non-empty.
    pub description: String,
    /// Date the fact was last confirmed, serialized as `YYYY-MM-DD`.
    pub last_validated: NaiveDate,
}

impl Fact {
    pub fn new(number: u32, description: impl Into<String>, last_validated: NaiveDate) -> Self {
        Self {
            number,
            description: description.into().trim().to_string(),
            last_validated,
        }
    }
}

/// The full titled set of facts at a point in time.
///
/// The pipeline never mutates a knowledge base in place: every run produces a
/// new value so the input stays available for audit and diffing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub title: String,
    #[serde(default)]
    pub facts: Vec<Fact>,
}

/// A structural defect found by [`KnowledgeBase::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyTitle,
    ZeroNumber,
    EmptyDescription(u32),
    DuplicateNumber(u32),
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => f.write_str("knowledge base title is empty"),
            Self::ZeroNumber => f.write_str("fact number 0 is not allowed"),
            Self::EmptyDescription(n) => write!(f, "fact #{n} has an empty description"),
            Self::DuplicateNumber(n) => write!(f, "fact number {n} appears more than once"),
        }
    }
}

impl KnowledgeBase {
    /// Build a knowledge base with its facts ordered by ascending number.
    pub fn new(title: impl Into<String>, mut facts: Vec<Fact>) -> Self {
        facts.sort_by_key(|f| f.number);
        Self {
            title: title.into(),
            facts,
        }
    }

    /// Look up a fact by its number.
    pub fn get(&self, number: u32) -> Option<&Fact> {
        self.facts.iter().find(|f| f.number == number)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Check the structural invariants. An empty list means the value is valid.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.title.trim().is_empty() {
            issues.push(ValidationIssue::EmptyTitle);
        }

        let mut seen = std::collections::BTreeSet::new();
        for fact in &self.facts {
            if fact.number == 0 {
                issues.push(ValidationIssue::ZeroNumber);
            }
            if fact.description.trim().is_empty() {
                issues.push(ValidationIssue::EmptyDescription(fact.number));
            }
            if !seen.insert(fact.number) {
                issues.push(ValidationIssue::DuplicateNumber(fact.number));
            }
        }
        issues
    }
}

/// An incoming status message. Opaque to the pipeline beyond being rendered
/// into the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl SlackMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            channel: None,
            user: None,
            timestamp: None,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}
