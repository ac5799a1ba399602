//! Reputation node binary
//!
//! Serves newline-delimited JSON requests on stdin and writes one JSON
//! response per line to stdout.

use anyhow::Context;
use reputation_core::{command, Config, ReputationStateMachine};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => Config::from_env().context("Failed to load config from environment")?,
    };

    // Initialize tracing (stderr, stdout carries responses)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Starting reputation node"
    );

    let machine = ReputationStateMachine::from_config(&config).context("Invalid configuration")?;
    if machine.marketplaces().is_empty() {
        tracing::warn!("No marketplaces configured; transaction initiation is disabled");
    }

    let requests = command::serve(
        &machine,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    );

    tokio::select! {
        served = requests => {
            let served = served.context("Failed to serve requests")?;
            tracing::info!(requests = served, "Input closed");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
        }
    }

    tracing::info!(
        users = machine.get_all_users().len(),
        transactions = machine.get_transaction_count(),
        "Shutting down reputation node"
    );
    Ok(())
}
