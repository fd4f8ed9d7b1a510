//! CLI `process` command: run one merge over the configured input source.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::FactkeeperConfig;
use crate::knowledge::table::render_markdown;
use crate::llm::replay::ReplayClient;
use crate::llm::{self, GenerateOptions, LlmClient};
use crate::pipeline::KnowledgeProcessor;
use crate::source::{self, InputSource};

/// Load inputs, run the pipeline, and print (or write) the updated knowledge base.
///
/// `replay` swaps the configured LLM for a saved reply. The processing log is
/// always printed, including when the run fails.
pub async fn process(
    config: &FactkeeperConfig,
    replay: Option<&Path>,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let source = Arc::<dyn InputSource>::from(source::create_source(&config.source)?);
    let name = source.name().to_string();
    let input = source::load_input(source)
        .await
        .with_context(|| format!("failed to load input from {name} source"))?;

    let client: Arc<dyn LlmClient> = match replay {
        Some(path) => Arc::new(ReplayClient::new(path)),
        None => Arc::<dyn LlmClient>::from(llm::create_client(&config.llm)?),
    };
    let processor = KnowledgeProcessor::new(client, GenerateOptions::from_config(&config.llm));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg} ({elapsed})")
            .context("invalid spinner template")?,
    );
    spinner.set_message(format!(
        "Merging {} facts via {}",
        input.knowledge_base.len(),
        processor.client_name()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = processor
        .process(&input.guidelines, &input.knowledge_base, &input.message)
        .await;
    spinner.finish_and_clear();

    let markdown = render_markdown(&result.updated_knowledge_base);

    if json {
        let mut value = serde_json::to_value(&result)?;
        value["updated_knowledge_base_markdown"] = markdown.clone().into();
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{markdown}");
        println!();
        if result.success {
            println!("Changes: {}", result.changes);
        }
        if !result.warnings.is_empty() {
            println!("Warnings:");
            for warning in &result.warnings {
                println!("  - {warning}");
            }
        }
        println!();
        print!("{}", result.log.summary());
    }

    if let Some(error) = &result.error {
        anyhow::bail!("processing failed: {}: {}", error.kind, error.message);
    }

    if let Some(path) = output {
        write_atomic(path, &markdown).await?;
        eprintln!("Updated knowledge base written to {}", path.display());
    }

    Ok(())
}

/// Write via a temp file and rename so readers never see a partial table.
async fn write_atomic(dest: &Path, contents: &str) -> Result<()> {
    let tmp_path = dest.with_extension("tmp");
    tokio::fs::write(&tmp_path, format!("{contents}\n"))
        .await
        .with_context(|| format!("failed to write temp file: {}", tmp_path.display()))?;
    tokio::fs::rename(&tmp_path, dest)
        .await
        .context("failed to rename temp file")?;
    Ok(())
}
