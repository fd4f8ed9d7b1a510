//! CLI `doctor` command: run component diagnostics and print a health report.

use std::sync::Arc;

use anyhow::Result;

use crate::config::FactkeeperConfig;
use crate::health::{self, HealthStatus};
use crate::llm;
use crate::source::{self, InputSource};

/// Run component diagnostics and print a health report.
pub async fn doctor(config: &FactkeeperConfig) -> Result<()> {
    let source = Arc::<dyn InputSource>::from(source::create_source(&config.source)?);
    let client = llm::create_client(&config.llm);
    let client_error = client.as_ref().err().map(|e| e.to_string());

    let report = health::check_health(
        config,
        client.as_ref().ok().map(|c| &**c),
        client_error.as_deref(),
        Arc::clone(&source),
    )
    .await;

    println!("Factkeeper Health Report");
    println!("========================");
    println!();
    println!("LLM provider:      {}", config.llm.provider);
    println!("Model:             {}", config.llm.model);
    println!("Input source:      {}", source.name());
    println!();
    println!("Components:");
    for (name, component) in &report.components {
        let marker = match component.status {
            HealthStatus::Healthy => "OK  ",
            _ => "FAIL",
        };
        println!("  [{marker}] {name:<14} {}", component.details);
    }
    println!();
    println!("Overall status:    {}", report.overall_status.as_str().to_uppercase());

    if !report.is_healthy() {
        println!();
        println!("Recovery steps:");
        println!(
            "  1. Export the API key: export {}=<key>",
            config.llm.api_key_env
        );
        println!("  2. Check llm.base_url and llm.model in ~/.factkeeper/config.toml");
        println!("  3. For the files source, check the [source] paths exist and are readable");
    }

    Ok(())
}
