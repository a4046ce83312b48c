// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine queue message (§6.3): what the scheduler enqueues for an engine
//! instance to dequeue-and-lease.

use dalston_core::{EngineDescriptorId, JobId, Stage, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One input artifact reference carried on a queue message (§6.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineQueueInput {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub uri: String,
    #[serde(default)]
    pub checksum: Option<String>,
}

/// The message an engine instance dequeues-and-leases from its descriptor's
/// queue (§6.3, §4.4, §4.5 step 2-3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineQueueMessage {
    pub task_id: TaskId,
    pub job_id: JobId,
    pub stage: Stage,
    pub engine_id: EngineDescriptorId,
    pub attempt: u32,
    pub lease_seconds: u64,
    pub inputs: Vec<EngineQueueInput>,
    /// Stage-specific parameters (language hint, diarization config, ...).
    #[serde(default)]
    pub parameters: Value,
    /// URL/channel the engine polls to learn whether this task has been
    /// cancelled cooperatively (§4.5 step 8, §5 cancellation semantics).
    pub cancel_channel: String,
    pub deadline_at_ms: u64,
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
