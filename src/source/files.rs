//! File-backed input source.
//!
//! Guidelines and the message body are plain text. The knowledge base is
//! either JSON (`.json`) or the shared markdown table, whose title falls back
//! to the file stem when the document has no heading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{InputSource, ProcessingInput};
use crate::config::{expand_tilde, SourceConfig};
use crate::knowledge::{parse_knowledge_base, KnowledgeBase, SlackMessage};

#[derive(Debug, Clone)]
pub struct FileSource {
    pub guidelines_path: PathBuf,
    pub knowledge_base_path: PathBuf,
    pub message_path: PathBuf,
    pub channel: Option<String>,
    pub user: Option<String>,
}

impl FileSource {
    pub fn from_config(config: &SourceConfig) -> Self {
        Self {
            guidelines_path: expand_tilde(&config.guidelines_path),
            knowledge_base_path: expand_tilde(&config.knowledge_base_path),
            message_path: expand_tilde(&config.message_path),
            channel: config.message_channel.clone(),
            user: config.message_user.clone(),
        }
    }
}

impl InputSource for FileSource {
    fn name(&self) -> &str {
        "files"
    }

    fn load(&self) -> Result<ProcessingInput> {
        let guidelines = read(&self.guidelines_path, "guidelines")?;
        let knowledge_base = load_knowledge_base(&self.knowledge_base_path)?;

        let content = read(&self.message_path, "message")?;
        anyhow::ensure!(
            !content.trim().is_empty(),
            "message file {} is empty",
            self.message_path.display()
        );
        let message = SlackMessage {
            content,
            channel: self.channel.clone(),
            user: self.user.clone(),
            timestamp: None,
        };

        Ok(ProcessingInput {
            guidelines,
            knowledge_base,
            message,
        })
    }
}

fn read(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} file: {}", path.display()))
}

/// Load a knowledge base from JSON or from the markdown table layout.
pub fn load_knowledge_base(path: &Path) -> Result<KnowledgeBase> {
    let text = read(path, "knowledge base")?;

    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        let kb: KnowledgeBase = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse knowledge base JSON: {}", path.display()))?;
        return Ok(KnowledgeBase::new(kb.title, kb.facts));
    }

    let fallback = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Knowledge Base".to_string());
    let parsed = parse_knowledge_base(&text, &fallback)
        .with_context(|| format!("no facts found in {}", path.display()))?;
    for warning in &parsed.warnings {
        tracing::warn!(path = %path.display(), "{warning}");
    }
    Ok(parsed.knowledge_base)
}
