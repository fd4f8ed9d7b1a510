use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use factkeeper::{cli, config, server};

#[derive(Parser)]
#[command(name = "factkeeper", version, about = "LLM-merged fact sheets")]
struct Cli {
    /// Config file (defaults to ~/.factkeeper/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge the configured message into the configured knowledge base
    Process {
        /// Use a saved LLM reply instead of calling the configured provider
        #[arg(long)]
        replay: Option<PathBuf>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Write the updated knowledge base table to this file on success
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Check LLM connectivity, configuration and input source
    Doctor,
    /// Parse a knowledge base file and print it in the canonical table layout
    Render {
        file: PathBuf,
        /// Print JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Start the HTTP server
    Serve,
    /// Write a starter config and sample input files to ~/.factkeeper/
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::FactkeeperConfig::load_from(path)?,
        None => config::FactkeeperConfig::load()?,
    };

    // Log to stderr so stdout stays clean for tables and JSON.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Process {
            replay,
            json,
            output,
        } => {
            cli::process::process(&config, replay.as_deref(), json, output.as_deref()).await?;
        }
        Command::Doctor => {
            cli::doctor::doctor(&config).await?;
        }
        Command::Render { file, json } => {
            cli::render::render(&file, json)?;
        }
        Command::Serve => {
            server::serve(config).await?;
        }
        Command::Init => {
            let config_path = cli.config.unwrap_or_else(config::default_config_path);
            cli::init(&config_path, &config.source)?;
        }
    }

    Ok(())
}
