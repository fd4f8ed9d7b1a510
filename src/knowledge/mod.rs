//! Knowledge model and the markdown-table format it round-trips through.
//!
//! [`types`] holds the data model, [`table`] renders it, [`parse`] reads LLM
//! replies back into it and [`diff`] summarises what changed between two
//! versions.

pub mod diff;
pub mod parse;
pub mod table;
pub mod types;

pub use diff::KnowledgeBaseDiff;
pub use parse::{parse_knowledge_base, EmptyKnowledgeBase, ParseWarning, ParsedKnowledgeBase};
pub use table::render_markdown;
pub use types::{Fact, KnowledgeBase, SlackMessage, ValidationIssue};
