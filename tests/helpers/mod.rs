#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use factkeeper::knowledge::{Fact, KnowledgeBase};
use factkeeper::llm::{GenerateOptions, LlmClient, LlmError};
use factkeeper::pipeline::{KnowledgeProcessor, ProcessingLog};

/// Processing date pinned for every pipeline test.
pub fn today() -> NaiveDate {
    date("2025-06-18")
}

pub fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

/// Five facts with a gap between 2 and 6, as left behind by past deletions.
pub fn gapped_kb() -> KnowledgeBase {
    KnowledgeBase::new(
        "Current RN Project Facts",
        vec![
            Fact::new(1, "RN is a network of ~18,000 local restaurants.", date("2025-04-15")),
            Fact::new(2, "RN integration has ~11,287 live offers.", date("2025-06-11")),
            Fact::new(6, "ARR target is $10.6M by EOQ2 2025. ARR is $8.5M.", date("2025-06-11")),
            Fact::new(7, "Restaurant coverage is 62.7%.", date("2025-06-11")),
            Fact::new(8, "Card capture rate is 54.1%.", date("2025-06-11")),
        ],
    )
}

/// LLM stand-in that answers every call with the same reply and records the
/// prompts it was given.
pub struct ScriptedClient {
    reply: Result<String, LlmError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: LlmError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerateOptions,
        log: &mut ProcessingLog,
    ) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        log.info(format!("Scripted reply (prompt_chars={})", prompt.chars().count()));
        self.reply.clone()
    }
}

/// Processor over `client` with the processing date pinned to [`today`].
pub fn processor(client: Arc<ScriptedClient>) -> KnowledgeProcessor {
    KnowledgeProcessor::new(client, GenerateOptions::probe("test-model")).with_today(today())
}
