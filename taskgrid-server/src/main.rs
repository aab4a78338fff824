//! `taskgrid-server` -- in-memory task service.
//!
//! An axum HTTP server holding one board in memory. It speaks both the
//! rest and the legacy update/delete routes, so either client route style
//! can be exercised against it.
//!
//! # Usage
//!
//! ```bash
//! # Run on the default address 127.0.0.1:3000 under /api
//! cargo run --bin taskgrid-server
//!
//! # Empty board on a custom address
//! cargo run --bin taskgrid-server -- --bind 127.0.0.1:8080 --no-seed
//! ```

use std::sync::Arc;

use clap::Parser;
use taskgrid_server::config::{ServerCliArgs, ServerConfig};
use taskgrid_server::server::{self, ServerState};
use taskgrid_server::store::MemoryBoard;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let board = if config.seed_demo {
        MemoryBoard::seeded()
    } else {
        MemoryBoard::new()
    };
    let state = Arc::new(ServerState::new(board, &config.base_path));

    tracing::info!(addr = %config.bind_addr, base_path = %state.base_path(), "starting task server");

    match server::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "task server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "task server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start task server");
            std::process::exit(1);
        }
    }
}
