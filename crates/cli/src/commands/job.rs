// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dalston job` — submit/list/show/cancel/tasks over the gateway's job
//! operations (`§4.8`).

use crate::exit_error::ExitError;
use crate::output::{format_or_json, handle_list, OutputFormat};
use clap::{Args, Subcommand};
use dalston_core::job::{RetentionDays, SpeakerDetection, TimestampGranularity};
use dalston_daemon::gateway::Gateway;
use dalston_wire::SubmitRequest;
use std::io::Write;
use uuid::Uuid;

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// Submit a new transcription job.
    Submit {
        /// Tenant identifier the job is scoped to.
        #[arg(long)]
        tenant: String,
        /// Source audio URI.
        source_uri: String,
        /// Engine alias or id to transcribe with.
        #[arg(long, default_value = "fast")]
        model: String,
        /// ISO language code, or "auto".
        #[arg(long, default_value = "auto")]
        language: String,
        /// Speaker attribution mode: none, diarize, per_channel.
        #[arg(long, default_value = "none")]
        speaker_detection: String,
        /// Timestamp granularity: none, segment, word.
        #[arg(long, default_value = "segment")]
        timestamps: String,
        #[arg(long)]
        pii_detection: bool,
        #[arg(long)]
        redact_pii_audio: bool,
        #[arg(long)]
        pii_redaction_mode: Option<String>,
        /// Retention in days; 0 = transient, -1 = forever.
        #[arg(long)]
        retention_days: Option<i32>,
        #[arg(long)]
        correlation_id: Option<String>,
    },
    /// List jobs for a tenant.
    List {
        #[arg(long)]
        tenant: String,
    },
    /// Show a single job.
    Show { id: String },
    /// Cancel a running job.
    Cancel { id: String },
    /// List the tasks that make up a job's DAG.
    Tasks { id: String },
}

pub async fn run(
    args: JobArgs,
    gateway: &Gateway<dalston_core::clock::SystemClock>,
    format: OutputFormat,
) -> Result<(), ExitError> {
    match args.command {
        JobCommand::Submit {
            tenant,
            source_uri,
            model,
            language,
            speaker_detection,
            timestamps,
            pii_detection,
            redact_pii_audio,
            pii_redaction_mode,
            retention_days,
            correlation_id,
        } => {
            let req = SubmitRequest {
                tenant_id: tenant,
                source_uri,
                model,
                language,
                speaker_detection: parse_speaker_detection(&speaker_detection)?,
                timestamps_granularity: parse_timestamps(&timestamps)?,
                pii_detection,
                redact_pii_audio,
                pii_redaction_mode,
                retention_policy: retention_days.map(RetentionDays),
                correlation_id,
            };
            let job = gateway.submit(req).await.map_err(|err| ExitError::new(1, err.to_string()))?;
            format_or_json(format, &job, || println!("submitted job {} ({})", job.id, job.status))
                .map_err(|err| ExitError::new(1, err.to_string()))
        }
        JobCommand::List { tenant } => {
            let jobs = gateway.list_jobs(&tenant);
            handle_list(format, &jobs, "no jobs found", |jobs, out| {
                for job in jobs {
                    let stage = job.current_stage.as_deref().unwrap_or("-");
                    let _ = writeln!(out, "{}  {:<10}  {:>3}%  {}", job.id, job.status, job.progress_percent, stage);
                }
            })
            .map_err(|err| ExitError::new(1, err.to_string()))
        }
        JobCommand::Show { id } => {
            let job_id = parse_uuid(&id)?;
            let job = gateway.get_job(job_id).ok_or_else(|| ExitError::new(2, format!("job {id} not found")))?;
            format_or_json(format, &job, || {
                println!("id: {}", job.id);
                println!("status: {}", job.status);
                println!("progress: {}%", job.progress_percent);
                if let Some(stage) = &job.current_stage {
                    println!("current stage: {stage}");
                }
                if let Some(err) = &job.error {
                    println!("error: {err}");
                }
            })
            .map_err(|err| ExitError::new(1, err.to_string()))
        }
        JobCommand::Cancel { id } => {
            let job_id = parse_uuid(&id)?;
            let outcome = gateway.cancel_job(job_id).map_err(|err| ExitError::new(1, err.to_string()))?;
            println!("job {id}: {outcome:?}");
            Ok(())
        }
        JobCommand::Tasks { id } => {
            let job_id = parse_uuid(&id)?;
            let tasks = gateway.list_tasks(job_id);
            handle_list(format, &tasks, "no tasks found", |tasks, out| {
                for task in tasks {
                    let _ = writeln!(out, "{}  {:<12}  {:<10}  attempt {}", task.id, task.stage, task.status, task.attempt);
                }
            })
            .map_err(|err| ExitError::new(1, err.to_string()))
        }
    }
}

fn parse_uuid(id: &str) -> Result<Uuid, ExitError> {
    Uuid::parse_str(id).map_err(|_| ExitError::new(2, format!("invalid job id: {id}")))
}

fn parse_speaker_detection(s: &str) -> Result<SpeakerDetection, ExitError> {
    match s {
        "none" => Ok(SpeakerDetection::None),
        "diarize" => Ok(SpeakerDetection::Diarize),
        "per_channel" => Ok(SpeakerDetection::PerChannel),
        other => Err(ExitError::new(2, format!("invalid speaker_detection: {other}"))),
    }
}

fn parse_timestamps(s: &str) -> Result<TimestampGranularity, ExitError> {
    match s {
        "none" => Ok(TimestampGranularity::None),
        "segment" => Ok(TimestampGranularity::Segment),
        "word" => Ok(TimestampGranularity::Word),
        other => Err(ExitError::new(2, format!("invalid timestamps granularity: {other}"))),
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
