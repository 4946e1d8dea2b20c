use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod data_url;
mod render;

use cli::{Cli, Commands};
use studio_tracker::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for results.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "studio=warn,studio_tracker=warn".into()))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    tracing::debug!(api_url = %config.api_url, "Loaded client configuration");

    match cli.command {
        Commands::Generate(args) => commands::generate::run(config, args).await,
        Commands::Story(args) => commands::story::run(config, args).await,
        Commands::Models => commands::models::run(),
    }
}
