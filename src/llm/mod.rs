//! Text-generation capability used as the merge engine.
//!
//! Provides the [`LlmClient`] trait, the [`LlmError`] taxonomy, and two
//! implementations: [`openai::OpenAiClient`] for any OpenAI-compatible
//! chat-completion endpoint and [`replay::ReplayClient`] for replaying a saved
//! reply offline. The client is created via [`create_client`] from
//! configuration.

pub mod openai;
pub mod replay;

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::pipeline::log::ProcessingLog;

/// Failures of a single generation call. None of them are retried by the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// Network, authentication or server-side failure.
    #[error("LLM service unavailable: {0}")]
    Unavailable(String),

    /// The service throttled the request.
    #[error("LLM service rate limited the request{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    /// The service answered, but not with usable text.
    #[error("LLM returned a malformed response: {0}")]
    MalformedResponse(String),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(" (retry after {secs}s)"),
        None => String::new(),
    }
}

impl LlmError {
    /// Stable name used in logs and API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "LLMUnavailable",
            Self::RateLimited { .. } => "LLMRateLimited",
            Self::MalformedResponse(_) => "LLMMalformedResponse",
        }
    }
}

/// Per-call generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// System role text. `None` sends the prompt alone.
    pub system_prompt: Option<String>,
}

impl GenerateOptions {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: Some(config.temperature),
            max_tokens: Some(config.max_tokens),
            system_prompt: Some(crate::prompt::SYSTEM_PROMPT.to_string()),
        }
    }

    /// Smallest useful request, for connectivity probes.
    pub fn probe(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: Some(16),
            system_prompt: None,
        }
    }
}

/// Sends a prompt and returns the raw reply text.
///
/// Implementations record request and response sizes to the supplied
/// [`ProcessingLog`] and must never log credentials.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Short identifier for logs and health reports.
    fn name(&self) -> &str;

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
        log: &mut ProcessingLog,
    ) -> Result<String, LlmError>;
}

/// Create an LLM client from config.
///
/// `openai` needs the API key in the environment variable named by
/// `api_key_env`; `replay` needs `replay_path`.
pub fn create_client(config: &LlmConfig) -> anyhow::Result<Box<dyn LlmClient>> {
    match config.provider.as_str() {
        "openai" => {
            let api_key = config.api_key().ok_or_else(|| {
                anyhow::anyhow!(
                    "API key not found: set the {} environment variable",
                    config.api_key_env
                )
            })?;
            Ok(Box::new(openai::OpenAiClient::new(config, api_key)?))
        }
        "replay" => {
            let path = config
                .replay_path
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("llm.replay_path must be set for the replay provider"))?;
            Ok(Box::new(replay::ReplayClient::new(crate::config::expand_tilde(path))))
        }
        other => anyhow::bail!("unknown LLM provider: {other}. Supported: openai, replay"),
    }
}
