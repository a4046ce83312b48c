// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable lifecycle events consumed by the scheduler (§6.2).
//!
//! Serializes with `{"type": "job.created", ...fields}` format, the same
//! shape the event bus and the on-disk WAL both use. Unknown type tags
//! deserialize to `Custom` so additive payload changes never break replay
//! of an older log against a newer binary.

use crate::artifact::ArtifactId;
use crate::engine::EngineInstanceId;
use crate::job::JobId;
use crate::task::{ArtifactRef, TaskError, TaskId};
use serde::{Deserialize, Serialize};

/// Events that drive scheduler state transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "job.created")]
    JobCreated { job_id: JobId, correlation_id: Option<String> },

    #[serde(rename = "job.cancel_requested")]
    JobCancelRequested { job_id: JobId },

    #[serde(rename = "job.completed")]
    JobCompleted { job_id: JobId },

    #[serde(rename = "job.failed")]
    JobFailed { job_id: JobId, error: String },

    #[serde(rename = "job.cancelled")]
    JobCancelled { job_id: JobId },

    #[serde(rename = "task.ready")]
    TaskReady { job_id: JobId, task_id: TaskId },

    #[serde(rename = "task.started")]
    TaskStarted { job_id: JobId, task_id: TaskId, instance_id: EngineInstanceId, lease_deadline_ms: u64 },

    #[serde(rename = "task.completed")]
    TaskCompleted {
        job_id: JobId,
        task_id: TaskId,
        attempt: u32,
        instance_id: EngineInstanceId,
        outputs: Vec<ArtifactRef>,
    },

    #[serde(rename = "task.failed")]
    TaskFailed {
        job_id: JobId,
        task_id: TaskId,
        attempt: u32,
        instance_id: EngineInstanceId,
        error: TaskError,
    },

    #[serde(rename = "task.cancelled")]
    TaskCancelled { job_id: JobId, task_id: TaskId },

    #[serde(rename = "task.heartbeat_expired")]
    TaskHeartbeatExpired { job_id: JobId, task_id: TaskId },

    /// Artifact lifecycle, folded into the same log so the retention purger
    /// and State Store share one durable history (§4.7, supplemented —
    /// not in the §6.2 enumeration, which only lists job/task events, but
    /// needed to make purges replayable on restart).
    #[serde(rename = "artifact.purged")]
    ArtifactPurged { artifact_id: ArtifactId, purged_at_ms: u64 },

    /// Catch-all for forward-compatible deserialization of event types this
    /// binary doesn't know about yet.
    #[serde(other, skip_serializing)]
    Custom,
}

impl Event {
    /// The job this event pertains to, for per-job event-bus partitioning
    /// and for routing during WAL replay. `None` only for `Custom`.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            Event::JobCreated { job_id, .. }
            | Event::JobCancelRequested { job_id }
            | Event::JobCompleted { job_id }
            | Event::JobFailed { job_id, .. }
            | Event::JobCancelled { job_id }
            | Event::TaskReady { job_id, .. }
            | Event::TaskStarted { job_id, .. }
            | Event::TaskCompleted { job_id, .. }
            | Event::TaskFailed { job_id, .. }
            | Event::TaskCancelled { job_id, .. }
            | Event::TaskHeartbeatExpired { job_id, .. } => Some(*job_id),
            Event::ArtifactPurged { .. } | Event::Custom => None,
        }
    }

    /// Short type tag for structured logging, mirroring the `type` field
    /// used on the wire.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Event::JobCreated { .. } => "job.created",
            Event::JobCancelRequested { .. } => "job.cancel_requested",
            Event::JobCompleted { .. } => "job.completed",
            Event::JobFailed { .. } => "job.failed",
            Event::JobCancelled { .. } => "job.cancelled",
            Event::TaskReady { .. } => "task.ready",
            Event::TaskStarted { .. } => "task.started",
            Event::TaskCompleted { .. } => "task.completed",
            Event::TaskFailed { .. } => "task.failed",
            Event::TaskCancelled { .. } => "task.cancelled",
            Event::TaskHeartbeatExpired { .. } => "task.heartbeat_expired",
            Event::ArtifactPurged { .. } => "artifact.purged",
            Event::Custom => "custom",
        }
    }
}

/// Envelope wrapping a domain [`Event`] with bus/log metadata (§6.2):
/// `{event_id, event_type, job_id, timestamp, correlation_id, payload}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: u64,
    pub timestamp_ms: u64,
    #[serde(default)]
    pub correlation_id: Option<String>,
    pub payload: Event,
}

impl EventEnvelope {
    pub fn event_type(&self) -> &'static str {
        self.payload.type_tag()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
