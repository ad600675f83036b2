//! services/client/src/bin/docgen.rs

use clap::Parser;
use client_lib::{cli::Cli, commands, config::Config, error::ClientError};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    debug!("Configuration loaded, talking to {}", config.api_url);

    // --- 2. Run the Requested Command ---
    let cli = Cli::parse();
    commands::run(cli, &config).await
}
