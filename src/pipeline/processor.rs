//! The knowledge processor: one request→response merge cycle.
//!
//! ```text
//! START → BUILD_PROMPT → CALL_LLM → PARSE_RESPONSE → (VALIDATED | FAILED) → END
//! ```
//!
//! Every state entry is logged. Failures never escape [`KnowledgeProcessor::process`]:
//! they come back as `success == false` with the input knowledge base untouched and
//! the full log attached.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use super::error::{FailureReport, ProcessError};
use super::log::ProcessingLog;
use crate::knowledge::{
    parse_knowledge_base, KnowledgeBase, KnowledgeBaseDiff, ParseWarning, ParsedKnowledgeBase,
    SlackMessage, ValidationIssue,
};
use crate::llm::{GenerateOptions, LlmClient};
use crate::prompt::PromptBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Start,
    BuildPrompt,
    CallLlm,
    ParseResponse,
    Validated,
    Failed,
    End,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::BuildPrompt => "BUILD_PROMPT",
            Self::CallLlm => "CALL_LLM",
            Self::ParseResponse => "PARSE_RESPONSE",
            Self::Validated => "VALIDATED",
            Self::Failed => "FAILED",
            Self::End => "END",
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one invocation. Always carries a complete log.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub invocation_id: Uuid,
    pub success: bool,
    /// `VALIDATED` or `FAILED`.
    pub final_state: PipelineState,
    /// The new knowledge base on success, the input one on failure.
    pub updated_knowledge_base: KnowledgeBase,
    pub log: ProcessingLog,
    pub warnings: Vec<ParseWarning>,
    pub changes: KnowledgeBaseDiff,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureReport>,
}

/// Composes prompt building, the LLM call and response parsing.
///
/// Holds no per-invocation state: concurrent calls to [`process`](Self::process)
/// each get their own log and output.
#[derive(Clone)]
pub struct KnowledgeProcessor {
    client: Arc<dyn LlmClient>,
    options: GenerateOptions,
    today: Option<NaiveDate>,
}

impl KnowledgeProcessor {
    pub fn new(client: Arc<dyn LlmClient>, options: GenerateOptions) -> Self {
        Self {
            client,
            options,
            today: None,
        }
    }

    /// Pin the processing date instead of reading the local clock per invocation.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    pub async fn process(
        &self,
        guidelines: &str,
        knowledge_base: &KnowledgeBase,
        message: &SlackMessage,
    ) -> ProcessingResult {
        let invocation_id = Uuid::now_v7();
        let span = tracing::info_span!("process", invocation_id = %invocation_id);
        self.process_in_span(invocation_id, guidelines, knowledge_base, message)
            .instrument(span)
            .await
    }

    async fn process_in_span(
        &self,
        invocation_id: Uuid,
        guidelines: &str,
        knowledge_base: &KnowledgeBase,
        message: &SlackMessage,
    ) -> ProcessingResult {
        let mut log = ProcessingLog::new();
        let outcome = self.run(guidelines, knowledge_base, message, &mut log).await;

        match outcome {
            Ok(parsed) => {
                log.info(format!("Entering state {}", PipelineState::Validated));
                for warning in &parsed.warnings {
                    log.warning(warning.to_string());
                }
                let changes = knowledge_base.diff(&parsed.knowledge_base);
                log.info(format!(
                    "Knowledge base updated: {} facts before, {} after ({changes})",
                    knowledge_base.len(),
                    parsed.knowledge_base.len()
                ));
                log.info(format!("Entering state {}", PipelineState::End));

                ProcessingResult {
                    invocation_id,
                    success: true,
                    final_state: PipelineState::Validated,
                    updated_knowledge_base: parsed.knowledge_base,
                    log,
                    warnings: parsed.warnings,
                    changes,
                    error: None,
                }
            }
            Err(err) => {
                log.info(format!("Entering state {}", PipelineState::Failed));
                let warnings = match &err {
                    ProcessError::EmptyKnowledgeBase(empty) => empty.warnings.clone(),
                    _ => Vec::new(),
                };
                for warning in &warnings {
                    log.warning(warning.to_string());
                }
                log.error(format!("{}: {err}", err.kind()));
                log.info("Returning the input knowledge base unchanged");
                log.info(format!("Entering state {}", PipelineState::End));

                ProcessingResult {
                    invocation_id,
                    success: false,
                    final_state: PipelineState::Failed,
                    updated_knowledge_base: knowledge_base.clone(),
                    log,
                    warnings,
                    changes: KnowledgeBaseDiff::default(),
                    error: Some(FailureReport::from(&err)),
                }
            }
        }
    }

    async fn run(
        &self,
        guidelines: &str,
        knowledge_base: &KnowledgeBase,
        message: &SlackMessage,
        log: &mut ProcessingLog,
    ) -> Result<ParsedKnowledgeBase, ProcessError> {
        log.info(format!("Entering state {}", PipelineState::Start));
        check_inputs(knowledge_base, message)?;
        log.info(format!(
            "Inputs accepted: {} facts, {} guideline chars, {} message chars",
            knowledge_base.len(),
            guidelines.chars().count(),
            message.content.chars().count()
        ));

        log.info(format!("Entering state {}", PipelineState::BuildPrompt));
        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let prompt = PromptBuilder::new(today).build(guidelines, knowledge_base, message);
        log.info(format!(
            "Prompt built ({} chars, processing date {today})",
            prompt.chars().count()
        ));

        log.info(format!(
            "Entering state {} (client={}, model={})",
            PipelineState::CallLlm,
            self.client.name(),
            self.options.model
        ));
        let reply = self.client.generate(&prompt, &self.options, log).await?;

        log.info(format!("Entering state {}", PipelineState::ParseResponse));
        let parsed = parse_knowledge_base(&reply, &knowledge_base.title)?;
        log.info(format!(
            "Parsed {} facts ({} warnings)",
            parsed.knowledge_base.len(),
            parsed.warnings.len()
        ));
        Ok(parsed)
    }
}

fn check_inputs(knowledge_base: &KnowledgeBase, message: &SlackMessage) -> Result<(), ProcessError> {
    if message.content.trim().is_empty() {
        return Err(ProcessError::InvalidInput("message content is empty".into()));
    }
    let duplicates: Vec<String> = knowledge_base
        .validate()
        .into_iter()
        .filter(|issue| matches!(issue, ValidationIssue::DuplicateNumber(_)))
        .map(|issue| issue.to_string())
        .collect();
    if !duplicates.is_empty() {
        return Err(ProcessError::InvalidInput(duplicates.join("; ")));
    }
    Ok(())
}
