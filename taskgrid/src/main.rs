//! `taskgrid` — Kanban board client.
//!
//! Loads the board from the task service, runs one subcommand, and prints
//! the result. Configuration via CLI flags, environment variables, or
//! config file (`~/.config/taskgrid/config.toml`).
//!
//! ```bash
//! # Print the board
//! cargo run --bin taskgrid
//!
//! # Move a task against a service speaking the legacy routes
//! cargo run --bin taskgrid -- --base-url http://127.0.0.1:3000/api \
//!     --route-style legacy mv 1 done
//! ```

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskgrid::api::HttpTaskApi;
use taskgrid::board::{BoardEvent, BoardStore};
use taskgrid::cli::{self, Command};
use taskgrid::config::{CliArgs, ClientConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::load_without_file(&cli)
        }
    };

    let api = match HttpTaskApi::from_config(&config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(base_url = %api.base_url(), route_style = %api.route_style(), "taskgrid starting");

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let store = BoardStore::new(api)
        .with_events(events_tx)
        .with_max_title_len(config.max_title_len);

    let command = cli.command.unwrap_or(Command::Show);
    let mut stdout = io::stdout();
    let result = cli::run(&store, command, &mut stdout).await;

    while let Ok(event) = events_rx.try_recv() {
        if let BoardEvent::Failed(notice) = event {
            eprintln!("{notice}");
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is_reported() {
                eprintln!("error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Installs the `tracing` subscriber.
///
/// Logs go to stderr unless `file_path` is given, in which case they are
/// written through a non-blocking file appender. The returned
/// [`WorkerGuard`] must be held until exit so buffered entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let target = file_path.and_then(|path| {
        let target = split_log_path(path);
        if target.is_none() {
            eprintln!(
                "warning: log file {} has no file name, logging to stderr",
                path.display()
            );
        }
        target
    });
    let Some((log_dir, file_name)) = target else {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(env_filter)
            .init();
        return None;
    };

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Splits a log file path into its directory and file name.
///
/// Returns `None` for paths without a file name, such as `/` or `..`.
fn split_log_path(path: &Path) -> Option<(&Path, &OsStr)> {
    let file_name = path.file_name()?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Some((dir, file_name))
}
