// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dalston session` — allocate/release over the gateway's real-time
//! session operations (`§4.6`, `§4.8`).

use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};
use clap::{Args, Subcommand};
use dalston_core::job::RetentionDays;
use dalston_core::session::{SessionStats, SessionStatus};
use dalston_daemon::gateway::Gateway;
use dalston_daemon::router::AllocateRequest;
use uuid::Uuid;

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Allocate a real-time session against a dispatchable engine instance.
    Allocate {
        #[arg(long)]
        tenant: String,
        #[arg(long, default_value = "auto")]
        language: String,
        #[arg(long, default_value = "fast")]
        model: String,
        #[arg(long, default_value = "pcm16")]
        encoding: String,
        #[arg(long, default_value_t = 16_000)]
        sample_rate: u32,
        #[arg(long)]
        retention_days: Option<i32>,
    },
    /// Release a session this process previously allocated.
    Release {
        id: String,
        /// Terminal status: completed, error, interrupted.
        #[arg(long, default_value = "completed")]
        status: String,
        #[arg(long, default_value_t = 0.0)]
        audio_duration_s: f64,
        #[arg(long, default_value_t = 0)]
        segment_count: u64,
        #[arg(long, default_value_t = 0)]
        word_count: u64,
    },
}

pub fn run(
    args: SessionArgs,
    gateway: &Gateway<dalston_core::clock::SystemClock>,
    format: OutputFormat,
) -> Result<(), ExitError> {
    match args.command {
        SessionCommand::Allocate { tenant, language, model, encoding, sample_rate, retention_days } => {
            let req = AllocateRequest {
                tenant_id: tenant,
                language,
                model,
                encoding,
                sample_rate,
                retention: retention_days.map(RetentionDays).unwrap_or(RetentionDays::TRANSIENT),
            };
            let ticket = gateway.allocate_session(req).map_err(|err| ExitError::new(1, err.to_string()))?;
            format_or_json(format, &ticket, || println!("session {} on worker {}", ticket.session_id, ticket.worker_id))
                .map_err(|err| ExitError::new(1, err.to_string()))
        }
        SessionCommand::Release { id, status, audio_duration_s, segment_count, word_count } => {
            let session_id = Uuid::parse_str(&id).map_err(|_| ExitError::new(2, format!("invalid session id: {id}")))?;
            let status = parse_status(&status)?;
            let stats = SessionStats { audio_duration_s, segment_count, word_count };
            gateway.release_session(session_id, status, stats).map_err(|err| ExitError::new(1, err.to_string()))?;
            println!("session {id} released");
            Ok(())
        }
    }
}

fn parse_status(s: &str) -> Result<SessionStatus, ExitError> {
    match s {
        "completed" => Ok(SessionStatus::Completed),
        "error" => Ok(SessionStatus::Error),
        "interrupted" => Ok(SessionStatus::Interrupted),
        other => Err(ExitError::new(2, format!("invalid session status: {other}"))),
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
