//! Keep a small, dated fact sheet current by merging incoming messages into it
//! with an LLM.
//!
//! A knowledge base is a titled list of numbered facts, each with a
//! last-validated date. One processing run takes three inputs (guidelines, the
//! current knowledge base, a new message), asks the LLM for the complete
//! updated table, and parses the reply back into a new, validated knowledge
//! base. The input is never modified; failures return it unchanged together
//! with a full processing log.
//!
//! ```text
//! guidelines ─┐
//! knowledge ──┼─► prompt ─► LLM ─► parse ─► updated knowledge base + log
//! message ────┘
//! ```
//!
//! # Modules
//!
//! - [`knowledge`] - Fact / KnowledgeBase model, the shared markdown table, the reply parser
//! - [`prompt`] - Deterministic prompt construction
//! - [`llm`] - LLM client trait, OpenAI-compatible and replay implementations
//! - [`pipeline`] - The knowledge processor, its processing log and failure taxonomy
//! - [`source`] - Input sources (built-in fixture, files)
//! - [`health`] - Component diagnostics
//! - [`config`] - Configuration loading from TOML files and environment variables
//! - [`server`] - HTTP surface
//! - [`cli`] - Command implementations for the `factkeeper` binary

pub mod cli;
pub mod config;
pub mod health;
pub mod knowledge;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod server;
pub mod source;
