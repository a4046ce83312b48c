// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine result message (§6.4): what an engine instance publishes back on
//! `task.completed`/`task.failed`.

use dalston_core::{ArtifactRef, Sensitivity, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One output artifact an engine publishes on success (§6.4, §4.5 step 5-6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultOutput {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub uri: String,
    pub sensitivity: Sensitivity,
    pub store: bool,
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

/// The message an engine publishes when it finishes an attempt, success or
/// failure (§6.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EngineResultMessage {
    Completed {
        task_id: TaskId,
        attempt: u32,
        outputs: Vec<ResultOutput>,
        #[serde(default)]
        stats: Value,
    },
    Failed {
        task_id: TaskId,
        attempt: u32,
        error_kind: String,
        error_message: String,
        retryable: bool,
        #[serde(default)]
        partial_outputs: Vec<ArtifactRef>,
    },
}

impl EngineResultMessage {
    pub fn task_id(&self) -> TaskId {
        match self {
            EngineResultMessage::Completed { task_id, .. } => *task_id,
            EngineResultMessage::Failed { task_id, .. } => *task_id,
        }
    }

    pub fn attempt(&self) -> u32 {
        match self {
            EngineResultMessage::Completed { attempt, .. } => *attempt,
            EngineResultMessage::Failed { attempt, .. } => *attempt,
        }
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
