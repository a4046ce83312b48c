// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway-facing DTOs (§6.1, §4.8): the shapes `submit`/`get_job`/
//! `list_tasks`/`list_engines`/`allocate_session` hand back across the
//! (out-of-scope) HTTP/WS boundary.

use dalston_core::{
    AudioMetadata, Capabilities, EngineDescriptorId, EngineInstanceId, Job, JobId, JobResult,
    JobStatus, LanguageSupport, RetentionDays, RtfEstimates, SessionId, SpeakerDetection, Stage,
    Task, TaskError, TaskId, TaskStatus, TimestampGranularity,
};
use serde::{Deserialize, Serialize};

/// `POST /v1/audio/transcriptions` request body (§6.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub tenant_id: String,
    pub source_uri: String,
    pub model: String,
    pub language: String,
    pub speaker_detection: SpeakerDetection,
    pub timestamps_granularity: TimestampGranularity,
    #[serde(default)]
    pub pii_detection: bool,
    #[serde(default)]
    pub redact_pii_audio: bool,
    #[serde(default)]
    pub pii_redaction_mode: Option<String>,
    #[serde(default)]
    pub retention_policy: Option<RetentionDays>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

/// The full job record returned by `get_job` / `GET .../{id}` (§4.8, §6.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub status: JobStatus,
    pub created_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
    pub progress_percent: u8,
    pub current_stage: Option<String>,
    pub audio: AudioMetadata,
    pub result: JobResult,
    pub error: Option<String>,
    pub retry_count: u32,
}

impl From<&Job> for JobRecord {
    fn from(job: &Job) -> Self {
        JobRecord {
            id: job.id,
            status: job.status,
            created_at_ms: job.created_at_ms,
            started_at_ms: job.started_at_ms,
            completed_at_ms: job.completed_at_ms,
            progress_percent: job.progress_percent,
            current_stage: job.current_stage.clone(),
            audio: job.audio,
            result: job.result.clone(),
            error: job.error.clone(),
            retry_count: job.retry_count,
        }
    }
}

/// One row of `GET .../{id}/tasks` (§6.1, §4.8 `list_tasks`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub stage: Stage,
    pub engine_id: EngineDescriptorId,
    pub status: TaskStatus,
    pub attempt: u32,
    pub error: Option<TaskError>,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        TaskRecord {
            id: task.id,
            stage: task.stage,
            engine_id: task.engine_descriptor_id.clone(),
            status: task.status,
            attempt: task.attempt,
            error: task.error.clone(),
        }
    }
}

/// One row of `GET /v1/engines` (§6.1, §4.8 `list_engines`): static
/// descriptor fields plus a rollup of live instance status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineRecord {
    pub id: EngineDescriptorId,
    pub stage: Stage,
    pub languages: LanguageSupport,
    pub capabilities: Capabilities,
    pub rtf: RtfEstimates,
    pub max_concurrency: u32,
    pub aliases: Vec<String>,
    pub live_instances: u32,
    pub available_instances: u32,
}

/// Result of a successful `allocate_session` call (§4.6, §4.8).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTicket {
    pub session_id: SessionId,
    pub worker_id: EngineInstanceId,
    pub ticket: String,
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
