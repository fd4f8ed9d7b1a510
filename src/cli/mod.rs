pub mod doctor;
pub mod process;
pub mod render;

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::{expand_tilde, SourceConfig};
use crate::knowledge::table::render_markdown;
use crate::source::fixture::FixtureSource;

const CONFIG_TEMPLATE: &str = r#"[server]
log_level = "info"
host = "127.0.0.1"
port = 8787

[llm]
provider = "openai"
model = "gpt-4o"
temperature = 0.1
max_tokens = 4000
base_url = "https://api.openai.com/v1"
api_key_env = "OPENAI_API_KEY"

[source]
kind = "files"
"#;

/// Write a starter config to `config_path` plus sample guidelines, knowledge
/// base and message for the `files` source. Existing files are left untouched.
pub fn init(config_path: &Path, source: &SourceConfig) -> Result<()> {
    write_if_missing(config_path, CONFIG_TEMPLATE)?;
    write_if_missing(
        &expand_tilde(&source.guidelines_path),
        FixtureSource::guidelines(),
    )?;
    write_if_missing(
        &expand_tilde(&source.knowledge_base_path),
        &format!("{}\n", render_markdown(&FixtureSource::knowledge_base())),
    )?;
    write_if_missing(
        &expand_tilde(&source.message_path),
        &FixtureSource::message().content,
    )?;

    println!("Initialization complete. Run `factkeeper doctor` to verify the setup.");
    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        println!("Already exists: {}", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
