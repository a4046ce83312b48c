// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! `dalston`: the admin CLI. A one-shot process that starts the same
//! [`Daemon`] `dalstond` does, performs a single gateway operation, and
//! shuts back down — there is no wire protocol between this binary and a
//! running `dalstond`, so the two cannot be run concurrently against the
//! same data directory (`lifecycle::Daemon::start` takes an exclusive
//! single-instance lock).

mod color;
mod commands;
mod exit_error;
mod output;

use clap::Parser;
use commands::engine::EngineArgs;
use commands::job::JobArgs;
use commands::session::SessionArgs;
use dalston_daemon::env::{ConfigArgs, ConfigError};
use dalston_daemon::error::LifecycleError;
use dalston_daemon::lifecycle::Daemon;
use exit_error::ExitError;
use output::OutputFormat;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum MainError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("startup: {0}")]
    Startup(#[from] LifecycleError),
}

impl From<MainError> for ExitError {
    fn from(err: MainError) -> Self {
        ExitError::new(1, err.to_string())
    }
}

#[derive(Parser)]
#[command(name = "dalston", about = "Dalston admin CLI", styles = color::styles())]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Submit, inspect, and cancel transcription jobs.
    Job(JobArgs),
    /// Inspect the engine catalog and live instance status.
    Engine(EngineArgs),
    /// Allocate and release real-time sessions.
    Session(SessionArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", color::muted(&err.message));
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            ExitCode::from(err.code as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let config = cli.config.resolve().map_err(MainError::from)?;
    let format = cli.format;

    let daemon = Daemon::start(config).await.map_err(MainError::from)?;

    let result = match cli.command {
        Command::Job(args) => commands::job::run(args, &daemon.gateway, format).await,
        Command::Engine(args) => commands::engine::run(args, &daemon.gateway, format),
        Command::Session(args) => commands::session::run(args, &daemon.gateway, format),
    };

    daemon.shutdown().map_err(MainError::from)?;
    result
}
