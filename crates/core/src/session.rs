// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real-time WebSocket session (§3.6).

use crate::engine::EngineInstanceId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identity of one real-time transcription session.
    pub struct SessionId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Error,
    Interrupted,
}

crate::simple_display! {
    SessionStatus {
        Active => "active",
        Completed => "completed",
        Error => "error",
        Interrupted => "interrupted",
    }
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Active)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub audio_duration_s: f64,
    pub segment_count: u64,
    pub word_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeSession {
    pub id: SessionId,
    pub tenant_id: String,
    pub status: SessionStatus,
    pub language: String,
    pub model: String,
    pub encoding: String,
    pub sample_rate: u32,
    pub worker_id: EngineInstanceId,
    pub stats: SessionStats,
    pub started_at_ms: u64,
    pub ended_at_ms: Option<u64>,
    pub retention: crate::job::RetentionDays,
    pub purge_after_ms: Option<u64>,
    pub purged_at_ms: Option<u64>,
}

impl RealtimeSession {
    pub fn close(&mut self, status: SessionStatus, ended_at_ms: u64) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.ended_at_ms = Some(ended_at_ms);
    }
}

crate::builder! {
    pub struct RealtimeSessionBuilder => RealtimeSession {
        into {
            tenant_id: String = "test-tenant",
            language: String = "en",
            model: String = "fast",
            encoding: String = "pcm_s16le",
        }
        set {
            id: SessionId = SessionId::new(),
            status: SessionStatus = SessionStatus::Active,
            sample_rate: u32 = 16_000,
            worker_id: EngineInstanceId = EngineInstanceId::new(),
            stats: SessionStats = SessionStats::default(),
            started_at_ms: u64 = 0,
            ended_at_ms: Option<u64> = None,
            retention: crate::job::RetentionDays = crate::job::RetentionDays::days(30),
            purge_after_ms: Option<u64> = None,
            purged_at_ms: Option<u64> = None,
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
