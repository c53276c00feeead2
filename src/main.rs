//! Street Trivia - Dialogflow fulfillment webhook
//!
//! Quizzes users on the streets of a handful of cities:
//! - `serve` runs the fulfillment webhook
//! - `setup` registers the `city` and `street` entity types once per agent

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod dataset;
mod dialogflow;
mod fulfillment;
mod intent;
mod server;
mod setup;
mod webhook;

use crate::config::TriviaConfig;
use crate::dataset::CityDataset;
use crate::dialogflow::DialogflowClient;

#[derive(Parser, Debug)]
#[command(name = "street-trivia")]
#[command(about = "Street Trivia - Dialogflow fulfillment webhook")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value_t = config::default_config_path())]
    config: String,

    /// Run in development mode (binds to localhost)
    #[arg(long)]
    dev: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the fulfillment webhook (default)
    Serve {
        /// Override the configured listen address
        #[arg(long)]
        listen: Option<String>,
    },
    /// Create the city and street entity types in the agent
    Setup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG overrides (e.g., RUST_LOG=street_trivia=debug)
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("street_trivia={}", default_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.verbose)
                .with_file(args.verbose)
                .with_line_number(args.verbose),
        )
        .init();

    let config = TriviaConfig::load(&args.config, args.dev)?;
    info!("Configuration loaded from {}", args.config);

    let dataset = match &config.dataset_path {
        Some(path) => CityDataset::load(path)
            .with_context(|| format!("invalid city dataset {}", path))?,
        None => CityDataset::builtin(),
    };
    info!(cities = dataset.cities().len(), "City dataset ready");

    let client = DialogflowClient::new(&config)?;

    match args.command.unwrap_or(Command::Serve { listen: None }) {
        Command::Serve { listen } => {
            let agent = fulfillment::TriviaAgent::new(Arc::new(dataset), Arc::new(client));
            let app = server::router(agent, config.webhook_token.clone());
            let listen_addr = listen.unwrap_or_else(|| config.listen_addr.clone());
            server::serve(&listen_addr, app).await
        }
        Command::Setup => {
            let project_id = config.require_project_id()?;
            let created = setup::register_vocabularies(&client, project_id, &dataset).await?;
            info!(count = created.len(), "Entity types registered");
            Ok(())
        }
    }
}
