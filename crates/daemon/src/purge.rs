// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention Purger (C9, §4.7): a periodic sweep that deletes artifacts
//! whose retention window has elapsed and marks them purged durably.
//!
//! Jobs and real-time sessions carry their own `purge_after_ms` (derived
//! from [`dalston_core::job::RetentionDays`] at completion/release time),
//! but neither has a row worth deleting — a `Job`/`RealtimeSession` is
//! metadata, not blob storage. Purging them means scrubbing the fields
//! that point at now-deleted artifacts, not removing the job/session
//! record itself (the record stays queryable for audit; only its
//! `result`/`stats` references to blob storage are invalidated). Since
//! there is no `job.purged`/`session.purged` event in the schema, this
//! mirrors the `progress_percent`/`current_stage` precedent (§9 "Global
//! state"): the scrub is a direct `MaterializedState` mutation, durable
//! at the next snapshot rather than WAL-durable per purge.

use crate::error::PurgeError;
use crate::SharedStore;
use dalston_adapters::object_store::ObjectStore;
use dalston_core::clock::Clock;
use dalston_core::event::Event;
use std::sync::Arc;

/// Counts from one sweep, logged by the caller's scheduling loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub artifacts_purged: usize,
    pub artifacts_failed: usize,
    pub jobs_scrubbed: usize,
    pub sessions_scrubbed: usize,
}

#[derive(Clone)]
pub struct RetentionPurger<C: Clock> {
    store: SharedStore,
    object_store: Arc<dyn ObjectStore>,
    clock: C,
}

impl<C: Clock> RetentionPurger<C> {
    pub fn new(store: SharedStore, object_store: Arc<dyn ObjectStore>, clock: C) -> Self {
        Self { store, object_store, clock }
    }

    /// One sweep over artifacts, jobs, and sessions past their
    /// `purge_after_ms`. Artifact deletion failures are logged and the
    /// row is left untouched for the next sweep to retry — nothing about
    /// a failed delete is durable, so retrying is always safe.
    pub async fn sweep(&self) -> Result<PurgeReport, PurgeError> {
        let now = self.clock.epoch_ms();
        let mut report = PurgeReport::default();

        let due_artifacts: Vec<_> = {
            let guard = self.store.lock();
            guard
                .state()
                .artifacts
                .values()
                .filter(|a| a.purged_at_ms.is_none() && a.purge_after_ms.is_some_and(|p| p <= now))
                .cloned()
                .collect()
        };

        for artifact in due_artifacts {
            match self.object_store.delete(&artifact.uri).await {
                Ok(()) => {
                    let mut guard = self.store.lock();
                    guard.append(Event::ArtifactPurged { artifact_id: artifact.id, purged_at_ms: now })?;
                    report.artifacts_purged += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        artifact_id = %artifact.id,
                        uri = %artifact.uri,
                        error = %err,
                        "artifact purge failed, will retry next sweep"
                    );
                    report.artifacts_failed += 1;
                }
            }
        }

        {
            let mut guard = self.store.lock();
            let state = guard.state_mut();
            for job in state.jobs.values_mut() {
                if job.purged_at_ms.is_none() && job.purge_after_ms.is_some_and(|p| p <= now) {
                    job.result = dalston_core::job::JobResult::default();
                    job.purged_at_ms = Some(now);
                    report.jobs_scrubbed += 1;
                }
            }
            for session in state.sessions.values_mut() {
                if session.purged_at_ms.is_none() && session.purge_after_ms.is_some_and(|p| p <= now) {
                    session.purged_at_ms = Some(now);
                    report.sessions_scrubbed += 1;
                }
            }
        }

        if report.artifacts_purged > 0 || report.jobs_scrubbed > 0 || report.sessions_scrubbed > 0 {
            tracing::info!(
                artifacts_purged = report.artifacts_purged,
                artifacts_failed = report.artifacts_failed,
                jobs_scrubbed = report.jobs_scrubbed,
                sessions_scrubbed = report.sessions_scrubbed,
                "retention sweep complete"
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
#[path = "purge_tests.rs"]
mod tests;
