//! Where the pipeline's three inputs come from.
//!
//! Provides the [`InputSource`] trait and two implementations: the built-in
//! [`fixture::FixtureSource`] and the file-backed [`files::FileSource`]. The
//! pipeline depends only on the [`ProcessingInput`] shape, so swapping sources
//! needs no pipeline change. Sources are created via [`create_source`].

pub mod files;
pub mod fixture;

use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;

use crate::config::SourceConfig;
use crate::knowledge::{KnowledgeBase, SlackMessage};

/// The three inputs of one processing run.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingInput {
    pub guidelines: String,
    #[serde(alias = "current_knowledge_base")]
    pub knowledge_base: KnowledgeBase,
    #[serde(alias = "slack_message")]
    pub message: SlackMessage,
}

/// Supplies guidelines, the current knowledge base and the new message.
pub trait InputSource: Send + Sync {
    fn name(&self) -> &str;

    fn load(&self) -> anyhow::Result<ProcessingInput>;
}

/// Run [`InputSource::load`] on the blocking pool so file reads never stall an
/// async worker.
pub async fn load_input(source: Arc<dyn InputSource>) -> anyhow::Result<ProcessingInput> {
    tokio::task::spawn_blocking(move || source.load())
        .await
        .context("input source task failed")?
}

/// Create an input source from config.
pub fn create_source(config: &SourceConfig) -> anyhow::Result<Box<dyn InputSource>> {
    match config.kind.as_str() {
        "fixture" => Ok(Box::new(fixture::FixtureSource)),
        "files" => Ok(Box::new(files::FileSource::from_config(config))),
        other => anyhow::bail!("unknown input source: {other}. Supported: fixture, files"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_source_by_kind() {
        let mut config = SourceConfig::default();
        assert_eq!(create_source(&config).unwrap().name(), "fixture");
        config.kind = "files".into();
        assert_eq!(create_source(&config).unwrap().name(), "files");
        config.kind = "sheets".into();
        assert!(create_source(&config).is_err());
    }

    struct ThreadRecorder(std::sync::Mutex<Option<std::thread::ThreadId>>);

    impl InputSource for ThreadRecorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn load(&self) -> anyhow::Result<ProcessingInput> {
            *self.0.lock().unwrap() = Some(std::thread::current().id());
            fixture::FixtureSource.load()
        }
    }

    #[tokio::test]
    async fn load_input_runs_on_the_blocking_pool() {
        let source = Arc::new(ThreadRecorder(std::sync::Mutex::new(None)));
        let input = load_input(source.clone()).await.unwrap();
        assert_eq!(input.knowledge_base.len(), 10);

        let loaded_on = source.0.lock().unwrap().unwrap();
        assert_ne!(loaded_on, std::thread::current().id());
    }

    #[tokio::test]
    async fn load_input_passes_errors_through() {
        let config = SourceConfig {
            kind: "files".into(),
            guidelines_path: "/nonexistent/factkeeper/guidelines.md".into(),
            ..SourceConfig::default()
        };
        let source = Arc::<dyn InputSource>::from(create_source(&config).unwrap());
        let err = load_input(source).await.unwrap_err();
        assert!(format!("{err:#}").contains("guidelines"));
    }

    #[test]
    fn input_accepts_wire_field_names() {
        let json = r##"{
            "guidelines": "g",
            "current_knowledge_base": {"title": "t", "facts": []},
            "slack_message": {"content": "m", "channel": "#c"}
        }"##;
        let input: ProcessingInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.knowledge_base.title, "t");
        assert_eq!(input.message.channel.as_deref(), Some("#c"));
    }
}
