// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task: one unit of work dispatched to one engine (§3.2).

use crate::engine::{EngineDescriptorId, EngineInstanceId};
use crate::job::JobId;
use crate::stage::Stage;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identity of one task row. Unique per `(job_id, stage)` — I1.
    pub struct TaskId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Ready,
    Running,
    Completed,
    Failed,
    Skipped,
    Cancelled,
}

crate::simple_display! {
    TaskStatus {
        Pending => "pending",
        Ready => "ready",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Skipped => "skipped",
        Cancelled => "cancelled",
    }
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped | TaskStatus::Cancelled
        )
    }

    /// A terminal status that counts as "satisfied" for downstream
    /// dependency resolution (§4.3 step 3: "all terminal-success").
    pub fn is_terminal_success(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Skipped)
    }
}

/// A reference to an artifact consumed or produced by a task, as carried
/// on the task row and on the wire (§6.3, §6.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub artifact_type: String,
    pub uri: String,
    #[serde(default)]
    pub checksum: Option<String>,
}

/// Structured, non-retryable vs. retryable error recorded on a failed task
/// (§6.4, §7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskError {
    pub kind: String,
    pub message: String,
    pub retryable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub job_id: JobId,
    pub stage: Stage,
    pub engine_descriptor_id: EngineDescriptorId,
    pub status: TaskStatus,
    pub attempt: u32,
    pub lease_holder: Option<EngineInstanceId>,
    pub lease_deadline_ms: Option<u64>,
    pub inputs: Vec<ArtifactRef>,
    pub outputs: Vec<ArtifactRef>,
    pub error: Option<TaskError>,
    pub timeout_s: u64,
    /// Stages this task depends on; all must be terminal-success before
    /// this task becomes `ready` (§4.2, §4.3).
    pub depends_on: Vec<Stage>,
}

impl Task {
    /// I2: at any instant at most one engine instance holds a live lease.
    /// A completion is only honored if the reporting instance still holds
    /// the lease that was active when it was dispatched (§4.3 step 3).
    pub fn lease_matches(&self, instance: EngineInstanceId) -> bool {
        self.lease_holder == Some(instance)
    }

    pub fn lease_expired(&self, now_ms: u64) -> bool {
        matches!(self.lease_deadline_ms, Some(deadline) if now_ms >= deadline)
    }
}

/// Derive the task timeout from audio duration and engine RTF (§4.3).
pub const MIN_TIMEOUT_S: u64 = 60;
const SAFETY: f64 = 3.0;
const DEFAULT_RTF: f64 = 1.0;

pub fn compute_timeout_s(audio_duration_s: Option<f64>, engine: &crate::engine::EngineDescriptor) -> u64 {
    let rtf = if engine.capabilities.uses_gpu() {
        engine.rtf.gpu.unwrap_or(DEFAULT_RTF)
    } else {
        engine.rtf.cpu.unwrap_or(DEFAULT_RTF)
    };
    match audio_duration_s {
        Some(duration) => {
            let computed = (duration * rtf * SAFETY).ceil() as u64;
            computed.max(MIN_TIMEOUT_S)
        }
        None => MIN_TIMEOUT_S * 5,
    }
}

crate::builder! {
    pub struct TaskBuilder => Task {
        set {
            id: TaskId = TaskId::new(),
            job_id: JobId = JobId::new(),
            stage: Stage = Stage::Prepare,
            engine_descriptor_id: EngineDescriptorId = EngineDescriptorId::new("test-engine"),
            status: TaskStatus = TaskStatus::Pending,
            attempt: u32 = 0,
            lease_holder: Option<EngineInstanceId> = None,
            lease_deadline_ms: Option<u64> = None,
            inputs: Vec<ArtifactRef> = Vec::new(),
            outputs: Vec<ArtifactRef> = Vec::new(),
            error: Option<TaskError> = None,
            timeout_s: u64 = MIN_TIMEOUT_S,
            depends_on: Vec<Stage> = Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
