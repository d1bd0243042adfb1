//! sentiment-gateway - batched sentiment classification service

#![allow(missing_docs)]

use anyhow::Context;
use clap::Parser;
use sentiment_gateway::config::Config;
use sentiment_gateway::server;
use sentiment_gateway::utils::logging::init_logging;
use std::path::PathBuf;
use std::process::ExitCode;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "gateway", version, about = "Batched sentiment classification gateway")]
struct Cli {
    /// Path to the YAML configuration file; defaults and environment are used when absent
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::from_env().context("loading configuration from environment")?,
    };

    init_logging(config.logging())?;

    server::builder::run_server(config).await?;
    Ok(())
}

#[actix_web::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Logging may not be initialized yet
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
