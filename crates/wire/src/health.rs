// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /health` payload shape (§6.1). `GET /metrics` is Prometheus text
//! exposition and has no typed payload here — it's produced directly by
//! the `tracing`/metrics-recorder wiring in `dalston-daemon`.

use serde::{Deserialize, Serialize};

/// `{"status": "healthy"}` or the degraded variant the gateway maps to a
/// `503` (§6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Rollup of the retention purger's last sweep, surfaced on `/health` and
/// in admin status output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsHealthSummary {
    pub last_sweep_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
