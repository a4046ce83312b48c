// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine-specific work function (§4.5 step 4): a black box with a
//! stable contract. Given the task's fetched input bytes and its
//! stage-specific parameters, produce output artifact bytes and a result
//! manifest, or a structured, possibly-retryable error.

use async_trait::async_trait;
use dalston_core::task::TaskError;
use serde_json::Value;

/// One input artifact, already fetched from object storage (§4.5 step 3).
#[derive(Debug, Clone)]
pub struct FetchedInput {
    pub artifact_type: String,
    pub uri: String,
    pub bytes: Vec<u8>,
}

/// One output artifact a work function produces. The worker assigns the
/// actual storage URI (attempt-scoped, §4.5 idempotence requirement) —
/// the work function only supplies the bytes and their declared type.
#[derive(Debug, Clone)]
pub struct ProducedArtifact {
    pub artifact_type: String,
    pub bytes: Vec<u8>,
}

/// What a successful work-function invocation returns (§6.4 result
/// manifest): the produced artifacts plus whatever stage-specific summary
/// (transcript stats, detected language, diarization turns, ...) the
/// scheduler or downstream stages need but that isn't itself an artifact.
#[derive(Debug, Clone, Default)]
pub struct WorkOutput {
    pub artifacts: Vec<ProducedArtifact>,
    pub manifest: Value,
}

/// The engine-specific black box (§4.5 step 4). One implementation per
/// stage (`prepare`, `transcribe`, `align`, `diarize`, `pii_detect`,
/// `audio_redact`, `merge`, ...); the worker loop is identical for all of
/// them.
#[async_trait]
pub trait EngineWork: Send + Sync {
    async fn execute(&self, inputs: Vec<FetchedInput>, parameters: Value) -> Result<WorkOutput, TaskError>;
}
