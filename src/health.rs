//! Read-only diagnostics: LLM connectivity, configuration presence and input
//! source availability. Never runs a merge and never touches a knowledge base
//! beyond loading it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::FactkeeperConfig;
use crate::llm::{GenerateOptions, LlmClient};
use crate::pipeline::log::ProcessingLog;
use crate::source::{self, InputSource};

pub const LLM_COMPONENT: &str = "llm";
pub const CONFIG_COMPONENT: &str = "configuration";
pub const SOURCE_COMPONENT: &str = "input_source";

const PROBE_PROMPT: &str = "Reply with the single word OK.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    pub details: String,
}

impl ComponentHealth {
    fn healthy(details: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            details: details.into(),
        }
    }

    fn unhealthy(details: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            details: details.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub components: BTreeMap<String, ComponentHealth>,
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.overall_status == HealthStatus::Healthy
    }
}

/// Run every component check.
///
/// `client` is `None` when the LLM client could not be built; `client_error`
/// then explains why. Missing configuration makes the report unhealthy; any
/// other failing component makes it degraded.
pub async fn check_health(
    config: &FactkeeperConfig,
    client: Option<&dyn LlmClient>,
    client_error: Option<&str>,
    source: Arc<dyn InputSource>,
) -> HealthReport {
    let mut components = BTreeMap::new();

    let config_health = check_configuration(config);
    components.insert(CONFIG_COMPONENT.to_string(), config_health);

    let llm_health = match client {
        Some(client) => check_llm(client, &config.llm.model).await,
        None => ComponentHealth::unhealthy(format!(
            "client not available: {}",
            client_error.unwrap_or("not configured")
        )),
    };
    components.insert(LLM_COMPONENT.to_string(), llm_health);

    components.insert(SOURCE_COMPONENT.to_string(), check_source(source).await);

    let overall_status = if components[CONFIG_COMPONENT].status != HealthStatus::Healthy {
        HealthStatus::Unhealthy
    } else if components
        .values()
        .any(|c| c.status != HealthStatus::Healthy)
    {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    tracing::info!(status = %overall_status, "health check completed");

    HealthReport {
        overall_status,
        components,
        checked_at: Utc::now(),
    }
}

fn check_configuration(config: &FactkeeperConfig) -> ComponentHealth {
    let mut missing = Vec::new();
    if config.llm.model.trim().is_empty() {
        missing.push("llm.model".to_string());
    }
    match config.llm.provider.as_str() {
        "openai" => {
            if config.llm.api_key().is_none() {
                missing.push(format!("{} environment variable", config.llm.api_key_env));
            }
        }
        "replay" => {
            if config.llm.replay_path.is_none() {
                missing.push("llm.replay_path".to_string());
            }
        }
        other => missing.push(format!("supported llm.provider (got {other:?})")),
    }

    if missing.is_empty() {
        ComponentHealth::healthy("All required configuration present")
    } else {
        ComponentHealth::unhealthy(format!("Missing: {}", missing.join(", ")))
    }
}

async fn check_llm(client: &dyn LlmClient, model: &str) -> ComponentHealth {
    let mut scratch = ProcessingLog::new();
    let started = Instant::now();
    match client
        .generate(PROBE_PROMPT, &GenerateOptions::probe(model), &mut scratch)
        .await
    {
        Ok(_) => ComponentHealth::healthy(format!(
            "{} round trip succeeded in {} ms",
            client.name(),
            started.elapsed().as_millis()
        )),
        Err(e) => ComponentHealth::unhealthy(format!("{}: {e}", e.kind())),
    }
}

async fn check_source(source: Arc<dyn InputSource>) -> ComponentHealth {
    let name = source.name().to_string();
    match source::load_input(source).await {
        Ok(input) => {
            let issues = input.knowledge_base.validate();
            if issues.is_empty() {
                ComponentHealth::healthy(format!(
                    "{}: loaded {} facts and {} characters of guidelines",
                    name,
                    input.knowledge_base.len(),
                    input.guidelines.chars().count()
                ))
            } else {
                let issues: Vec<String> = issues.iter().map(ToString::to_string).collect();
                ComponentHealth::unhealthy(format!(
                    "{}: knowledge base is invalid: {}",
                    name,
                    issues.join("; ")
                ))
            }
        }
        Err(e) => ComponentHealth::unhealthy(format!("{}: {e:#}", name)),
    }
}
