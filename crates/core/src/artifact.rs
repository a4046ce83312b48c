// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifacts: immutable byte blobs referenced by URI (§3.3, I4).

use crate::owner::OwnerId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identity of one artifact row.
    pub struct ArtifactId;
}

/// Sensitivity label controlling downstream handling (§3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    RawPii,
    Redacted,
    Metadata,
}

crate::simple_display! {
    Sensitivity {
        RawPii => "raw_pii",
        Redacted => "redacted",
        Metadata => "metadata",
    }
}

/// An immutable byte blob produced by one task (or session) and consumed
/// by downstream tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub owner: OwnerId,
    /// e.g. `"audio.source"`, `"audio.mono_16k"`, `"transcript.raw"`,
    /// `"transcript.redacted"`, `"pii.entities"`, `"audio.redacted"`.
    pub artifact_type: String,
    pub uri: String,
    pub sensitivity: Sensitivity,
    pub store: bool,
    pub ttl_seconds: Option<u64>,
    pub size_bytes: Option<u64>,
    pub created_at_ms: u64,
    pub available_at_ms: Option<u64>,
    pub purge_after_ms: Option<u64>,
    pub purged_at_ms: Option<u64>,
}

impl Artifact {
    /// I4: published artifacts are never overwritten; retries produce a
    /// fresh, attempt-scoped URI, so two artifacts with the same owner and
    /// type are never the same row once published.
    pub fn is_purged(&self) -> bool {
        self.purged_at_ms.is_some()
    }

    /// `store=false` artifacts are internal scratch and are never published
    /// to a consumer outside the task that produced them.
    pub fn is_publishable(&self) -> bool {
        self.store
    }
}

crate::builder! {
    pub struct ArtifactBuilder => Artifact {
        into {
            artifact_type: String = "transcript.raw",
            uri: String = "mem://artifact",
        }
        set {
            id: ArtifactId = ArtifactId::new(),
            owner: OwnerId = OwnerId::Job(crate::job::JobId::new()),
            sensitivity: Sensitivity = Sensitivity::Metadata,
            store: bool = true,
            ttl_seconds: Option<u64> = None,
            size_bytes: Option<u64> = None,
            created_at_ms: u64 = 0,
            available_at_ms: Option<u64> = None,
            purge_after_ms: Option<u64> = None,
            purged_at_ms: Option<u64> = None,
        }
    }
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
