//! OpenAI-compatible chat-completion client.
//!
//! Works against the OpenAI API and any endpoint exposing the same
//! `/chat/completions` contract. Reasoning models (`o1*`) take neither a system
//! role nor a temperature, so the system text is folded into the user message
//! for them.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{GenerateOptions, LlmClient, LlmError};
use crate::config::LlmConfig;
use crate::pipeline::log::ProcessingLog;

pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig, api_key: String) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn request_body(prompt: &str, options: &GenerateOptions) -> serde_json::Value {
        if is_reasoning_model(&options.model) {
            let content = match &options.system_prompt {
                Some(system) => format!("{system}\n\n{prompt}"),
                None => prompt.to_string(),
            };
            let mut body = serde_json::json!({
                "model": options.model,
                "messages": [{ "role": "user", "content": content }],
            });
            if let Some(max) = options.max_tokens {
                body["max_completion_tokens"] = max.into();
            }
            return body;
        }

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &options.system_prompt {
            messages.push(serde_json::json!({ "role": "system", "content": system }));
        }
        messages.push(serde_json::json!({ "role": "user", "content": prompt }));

        let mut body = serde_json::json!({
            "model": options.model,
            "messages": messages,
        });
        if let Some(temperature) = options.temperature {
            body["temperature"] = temperature.into();
        }
        if let Some(max) = options.max_tokens {
            body["max_tokens"] = max.into();
        }
        body
    }
}

fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("o1")
}

fn retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
        log: &mut ProcessingLog,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(prompt, options);

        log.info(format!(
            "Sending request to LLM (model={}, prompt_chars={})",
            options.model,
            prompt.chars().count()
        ));
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LlmError::Unavailable(format!(
                    "authentication failed (HTTP {})",
                    status.as_u16()
                )));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(LlmError::RateLimited {
                    retry_after_secs: retry_after(&response),
                });
            }
            s if !s.is_success() => {
                return Err(LlmError::Unavailable(format!(
                    "API returned HTTP {}",
                    s.as_u16()
                )));
            }
            _ => {}
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(format!("undecodable body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LlmError::MalformedResponse("reply contained no text".into()))?;

        let elapsed_ms = started.elapsed().as_millis();
        match parsed.usage {
            Some(usage) => log.info(format!(
                "Received LLM response (response_chars={}, elapsed_ms={elapsed_ms}, \
                 prompt_tokens={}, completion_tokens={}, total_tokens={})",
                content.chars().count(),
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            )),
            None => log.info(format!(
                "Received LLM response (response_chars={}, elapsed_ms={elapsed_ms})",
                content.chars().count()
            )),
        }

        Ok(content)
    }
}
