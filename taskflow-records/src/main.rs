//! `TaskFlow` record server.
//!
//! Serves the board and task record tables over HTTP for the `taskflow`
//! client.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 127.0.0.1:8787
//! cargo run --bin taskflow-records
//!
//! # Require credentials
//! cargo run --bin taskflow-records -- --project-id demo --public-key secret
//! ```

use std::sync::Arc;

use clap::Parser;
use taskflow_records::config::{RecordsCliArgs, RecordsConfig};
use taskflow_records::server::{self, ServerState};
use taskflow_records::store::RecordStore;

#[tokio::main]
async fn main() {
    let cli = RecordsCliArgs::parse();

    let config = match RecordsConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        addr = %config.bind_addr,
        owner = %config.owner,
        auth = config.requires_credentials(),
        "starting taskflow record server"
    );

    let state = Arc::new(
        ServerState::new(RecordStore::new(config.owner.clone()))
            .with_credentials(config.project_id.clone(), config.public_key.clone()),
    );

    match server::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "record server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "record server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start record server");
            std::process::exit(1);
        }
    }
}
