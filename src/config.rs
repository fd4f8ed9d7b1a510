use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FactkeeperConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub log_level: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    /// `openai` (any OpenAI-compatible endpoint) or `replay`.
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub base_url: String,
    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the config.
    pub api_key_env: String,
    /// Client-side request timeout. Unset means the transport's own limits apply.
    pub timeout_secs: Option<u64>,
    /// Saved reply returned by the `replay` provider.
    pub replay_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    /// `fixture` (built-in sample data) or `files`.
    pub kind: String,
    pub guidelines_path: String,
    pub knowledge_base_path: String,
    pub message_path: String,
    pub message_channel: Option<String>,
    pub message_user: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            host: "127.0.0.1".into(),
            port: 8787,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-4o".into(),
            temperature: 0.1,
            max_tokens: 4000,
            base_url: "https://api.openai.com/v1".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            timeout_secs: None,
            replay_path: None,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        let dir = default_factkeeper_dir();
        let path = |name: &str| dir.join(name).to_string_lossy().into_owned();
        Self {
            kind: "fixture".into(),
            guidelines_path: path("guidelines.md"),
            knowledge_base_path: path("knowledge_base.md"),
            message_path: path("message.txt"),
            message_channel: None,
            message_user: None,
        }
    }
}

/// Returns `~/.factkeeper/`, or `./.factkeeper/` when no home directory is known.
pub fn default_factkeeper_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".factkeeper")
}

/// Returns the default config file path: `~/.factkeeper/config.toml`
pub fn default_config_path() -> PathBuf {
    default_factkeeper_dir().join("config.toml")
}

impl FactkeeperConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            FactkeeperConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (FACTKEEPER_LOG_LEVEL, FACTKEEPER_MODEL,
    /// FACTKEEPER_BASE_URL, FACTKEEPER_SOURCE).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FACTKEEPER_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("FACTKEEPER_MODEL") {
            self.llm.model = val;
        }
        if let Ok(val) = std::env::var("FACTKEEPER_BASE_URL") {
            self.llm.base_url = val;
        }
        if let Ok(val) = std::env::var("FACTKEEPER_SOURCE") {
            self.source.kind = val;
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
