// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine descriptors (static, from manifest) and engine instances
//! (dynamic, registered at runtime) — §3.4, §3.5.

pub use crate::id::EngineDescriptorId;
use crate::stage::Stage;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identity of one running incarnation of an [`EngineDescriptor`].
    pub struct EngineInstanceId;
}

/// Which languages an engine descriptor declares support for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LanguageSupport {
    /// Declares support for "all" languages.
    Wildcard,
    /// An explicit list of supported ISO language codes.
    Explicit(Vec<String>),
}

impl LanguageSupport {
    /// Whether this descriptor covers the requested language. `auto`
    /// matches any engine (§4.2 engine selection policy).
    pub fn covers(&self, requested: &str) -> bool {
        if requested == "auto" {
            return true;
        }
        match self {
            LanguageSupport::Wildcard => true,
            LanguageSupport::Explicit(codes) => codes.iter().any(|c| c == requested),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, LanguageSupport::Wildcard)
    }
}

/// Capability flags an engine descriptor advertises (§3.4).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub word_timestamps: bool,
    pub streaming: bool,
    pub gpu_required: bool,
    pub gpu_optional: bool,
}

impl Capabilities {
    pub fn uses_gpu(&self) -> bool {
        self.gpu_required || self.gpu_optional
    }
}

/// Real-time-factor estimates used to derive task timeouts (§4.3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RtfEstimates {
    pub cpu: Option<f64>,
    pub gpu: Option<f64>,
}

/// Static engine description loaded once from the manifest (§3.4, §4.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineDescriptor {
    pub id: EngineDescriptorId,
    pub stage: Stage,
    pub languages: LanguageSupport,
    pub capabilities: Capabilities,
    pub rtf: RtfEstimates,
    pub max_concurrency: u32,
    /// Operational reference only; the scheduler never interprets it.
    pub image: String,
    /// User-facing aliases that resolve to this descriptor (e.g. `"fast"`).
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Liveness/readiness of one running engine instance (§3.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Available,
    Running,
    Unhealthy,
}

crate::simple_display! {
    InstanceStatus {
        Available => "available",
        Running => "running",
        Unhealthy => "unhealthy",
    }
}

/// A running incarnation of an [`EngineDescriptor`] (§3.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineInstance {
    pub id: EngineInstanceId,
    pub descriptor_id: EngineDescriptorId,
    pub heartbeat_at_ms: u64,
    pub loaded_model: String,
    pub status: InstanceStatus,
}

impl EngineInstance {
    pub fn is_alive(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.heartbeat_at_ms) < ttl_ms
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
