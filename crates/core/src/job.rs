// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier, request parameters, and state machine (§3.1).

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identity of one transcription request.
    pub struct JobId;
}

/// How the job's audio should be split for speaker attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerDetection {
    None,
    Diarize,
    PerChannel,
}

crate::simple_display! {
    SpeakerDetection {
        None => "none",
        Diarize => "diarize",
        PerChannel => "per_channel",
    }
}

/// Granularity of timestamps requested on the final transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampGranularity {
    None,
    Segment,
    Word,
}

crate::simple_display! {
    TimestampGranularity {
        None => "none",
        Segment => "segment",
        Word => "word",
    }
}

/// Maximum channels accepted for `speaker_detection=per_channel` (§9 open
/// question, resolved: reject larger requests synchronously).
pub const MAX_CHANNELS: u32 = 8;

/// A tenant's retention choice for a job, session, or artifact, as stored
/// (§9 migration note: integer model adopted directly).
///
/// `0` = transient (purge immediately on completion); `-1` = keep forever;
/// positive `N` = purge `N` days after completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetentionDays(pub i32);

impl RetentionDays {
    pub const TRANSIENT: RetentionDays = RetentionDays(0);
    pub const FOREVER: RetentionDays = RetentionDays(-1);

    pub fn days(n: u32) -> Self {
        Self(n as i32)
    }

    /// Derive `purge_after` (epoch ms) given the completion time, or `None`
    /// for "keep forever" (§4.7).
    pub fn purge_after_ms(&self, completed_at_ms: u64) -> Option<u64> {
        match self.0 {
            0 => Some(completed_at_ms),
            n if n < 0 => None,
            n => Some(completed_at_ms + (n as u64) * 24 * 60 * 60 * 1000),
        }
    }
}

/// Immutable request parameters supplied at submit time (§3.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobParams {
    pub tenant_id: String,
    pub source_uri: String,
    /// Requested model identifier or alias (e.g. `"fast"`, `"accurate"`).
    pub model: String,
    /// Requested language code, or `"auto"`.
    pub language: String,
    pub speaker_detection: SpeakerDetection,
    pub timestamps_granularity: TimestampGranularity,
    #[serde(default)]
    pub pii_detection: bool,
    #[serde(default)]
    pub redact_pii_audio: bool,
    #[serde(default)]
    pub pii_redaction_mode: Option<String>,
    pub retention: RetentionDays,
    /// Optional client-supplied idempotency key (L1).
    #[serde(default)]
    pub correlation_id: Option<String>,
}

/// Audio metadata derived during `prepare`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioMetadata {
    pub duration_s: Option<f64>,
    pub channels: Option<u32>,
    pub sample_rate: Option<u32>,
}

/// Job status (§3.1). Monotonic per I3: pending → running → (cancelling →)?
/// terminal, with no back-edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Cancelling,
    Cancelled,
    Completed,
    Failed,
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Cancelling => "cancelling",
        Cancelled => "cancelled",
        Completed => "completed",
        Failed => "failed",
    }
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }

    /// Whether transitioning from `self` to `next` is a legal monotonic step (I3).
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        match (self, next) {
            (a, b) if *a == b => true,
            (Pending, Running) => true,
            (Pending, Cancelled) | (Pending, Failed) => true,
            (Running, Cancelling) | (Running, Completed) | (Running, Failed) => true,
            (Running, Cancelled) => true,
            (Cancelling, Cancelled) | (Cancelling, Failed) => true,
            _ => false,
        }
    }
}

/// Final result fields, populated when the job reaches `completed` (§3.1).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub transcript_uri: Option<String>,
    pub language: Option<String>,
    pub word_count: Option<u64>,
    pub segment_count: Option<u64>,
    pub speaker_count: Option<u64>,
}

/// One transcription request end to end (§3.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub params: JobParams,
    pub created_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
    pub status: JobStatus,
    pub progress_percent: u8,
    /// Stage label of the earliest non-terminal task, or the label of the
    /// just-completed stage once the job is terminal (§4.3 step 7).
    pub current_stage: Option<String>,
    pub audio: AudioMetadata,
    pub result: JobResult,
    pub error: Option<String>,
    pub purge_after_ms: Option<u64>,
    pub purged_at_ms: Option<u64>,
    pub retry_count: u32,
}

/// Error raised by [`Job::transition`] when a caller attempts a status
/// change that would violate I3 (monotonic job status).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("illegal job status transition {from} -> {to}")]
pub struct IllegalJobTransition {
    pub from: JobStatus,
    pub to: JobStatus,
}

impl Job {
    pub fn new(id: JobId, params: JobParams, created_at_ms: u64) -> Self {
        Self {
            id,
            params,
            created_at_ms,
            started_at_ms: None,
            completed_at_ms: None,
            status: JobStatus::Pending,
            progress_percent: 0,
            current_stage: None,
            audio: AudioMetadata::default(),
            result: JobResult::default(),
            error: None,
            purge_after_ms: None,
            purged_at_ms: None,
            retry_count: 0,
        }
    }

    /// Apply a status transition, enforcing I3. Once terminal, only
    /// retention fields may subsequently change (enforced by callers not
    /// invoking `transition` again, since it would be a same-state no-op
    /// at best and an error at worst).
    pub fn transition(&mut self, next: JobStatus) -> Result<(), IllegalJobTransition> {
        if !self.status.can_transition_to(next) {
            return Err(IllegalJobTransition { from: self.status, to: next });
        }
        self.status = next;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        option {
            current_stage: String = None,
            error: String = None,
        }
        set {
            id: JobId = JobId::new(),
            params: JobParams = JobParams {
                tenant_id: "test-tenant".to_string(),
                source_uri: "mem://source.wav".to_string(),
                model: "auto".to_string(),
                language: "auto".to_string(),
                speaker_detection: SpeakerDetection::None,
                timestamps_granularity: TimestampGranularity::Word,
                pii_detection: false,
                redact_pii_audio: false,
                pii_redaction_mode: None,
                retention: RetentionDays::days(30),
                correlation_id: None,
            },
            created_at_ms: u64 = 0,
            started_at_ms: Option<u64> = None,
            completed_at_ms: Option<u64> = None,
            status: JobStatus = JobStatus::Pending,
            progress_percent: u8 = 0,
            audio: AudioMetadata = AudioMetadata::default(),
            result: JobResult = JobResult::default(),
            purge_after_ms: Option<u64> = None,
            purged_at_ms: Option<u64> = None,
            retry_count: u32 = 0,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
