// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dalstond`: the orchestrator process. Loads configuration, brings up
//! every component (`lifecycle::Daemon::start`), and drives the
//! reconcile/retention ticks until told to shut down.

use clap::Parser;
use dalston_daemon::env::{ConfigArgs, ConfigError};
use dalston_daemon::error::LifecycleError;
use dalston_daemon::lifecycle::Daemon;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum MainError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("startup: {0}")]
    Startup(#[from] LifecycleError),
}

#[derive(Debug, Parser)]
#[command(name = "dalstond", about = "Dalston orchestrator daemon")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.config.resolve()?;
    let sweep_interval = Duration::from_secs(config.retention_sweep_interval_s);

    let daemon = Daemon::start(config).await?;
    tracing::info!(replica_id = daemon.replica_id(), "ready");

    run_until_shutdown(&daemon, sweep_interval).await;

    daemon.shutdown()?;
    Ok(())
}

/// Events (`task.started`/`task.completed`/`task.failed` from engines,
/// `job.created` from a fresh `submit`) are drained far more often than
/// the reconcile/retention sweep runs, so a submitted job's tasks start
/// dispatching within one short poll instead of waiting a full sweep
/// interval.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(200);
const EVENT_VISIBILITY_SECONDS: u64 = 30;
const EVENT_BATCH_SIZE: usize = 64;

/// The event-pump / health-monitor / retention tick loop (§4.3 steps 2-7,
/// §4.6, §4.7), until `ctrl_c` or a `SIGTERM` arrives.
async fn run_until_shutdown(daemon: &Daemon, sweep_interval: Duration) {
    let mut event_tick = tokio::time::interval(EVENT_POLL_INTERVAL);
    event_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut sweep_tick = tokio::time::interval(sweep_interval);
    sweep_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = event_tick.tick() => {
                match daemon.gateway.pump_events(EVENT_VISIBILITY_SECONDS, EVENT_BATCH_SIZE).await {
                    Ok(0) => {}
                    Ok(n) => tracing::debug!(processed = n, "pumped events"),
                    Err(err) => tracing::warn!(%err, "event pump failed"),
                }
            }
            _ = sweep_tick.tick() => {
                if let Err(err) = daemon.reconcile().await {
                    tracing::warn!(%err, "reconcile pass failed");
                }
                match daemon.purger.sweep().await {
                    Ok(report) => tracing::debug!(?report, "retention sweep complete"),
                    Err(err) => tracing::warn!(%err, "retention sweep failed"),
                }
            }
            _ = shutdown_signal() => {
                tracing::info!("shutdown signal received");
                break;
            }
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("installing SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
