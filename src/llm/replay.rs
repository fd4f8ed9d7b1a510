//! Offline client that answers every prompt with a saved reply.
//!
//! Used to re-run the parser over a captured LLM reply, and for demos that
//! must not reach the network.

use std::path::PathBuf;

use async_trait::async_trait;

use super::{GenerateOptions, LlmClient, LlmError};
use crate::pipeline::log::ProcessingLog;

#[derive(Debug, Clone)]
pub struct ReplayClient {
    path: PathBuf,
}

impl ReplayClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LlmClient for ReplayClient {
    fn name(&self) -> &str {
        "replay"
    }

    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerateOptions,
        log: &mut ProcessingLog,
    ) -> Result<String, LlmError> {
        log.info(format!(
            "Replaying saved reply from {} (prompt_chars={})",
            self.path.display(),
            prompt.chars().count()
        ));

        let reply = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            LlmError::Unavailable(format!("cannot read {}: {e}", self.path.display()))
        })?;
        if reply.trim().is_empty() {
            return Err(LlmError::MalformedResponse(format!(
                "{} is empty",
                self.path.display()
            )));
        }

        log.info(format!("Received replayed response (response_chars={})", reply.chars().count()));
        Ok(reply)
    }
}
