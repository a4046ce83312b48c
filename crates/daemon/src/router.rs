// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Router (C8, §4.6): allocates real-time sessions onto the
//! least-loaded healthy engine instance and keeps the active-session set
//! consistent with which instances are actually alive.
//!
//! A session's "load" is never tracked as a separate counter — it is
//! always the live count of `status == Active` sessions whose `worker_id`
//! matches the instance, read straight out of `MaterializedState::sessions`.
//! That makes invariant (a) ("sum of per-worker active counts equals the
//! cardinality of the active-session set") true by construction instead of
//! something that can drift out of sync.

use crate::error::RouterError;
use crate::registry::EngineRegistry;
use crate::SharedStore;
use dalston_catalog::{Catalog, RequiredCapabilities};
use dalston_core::clock::Clock;
use dalston_core::engine::EngineInstanceId;
use dalston_core::job::RetentionDays;
use dalston_core::session::{RealtimeSession, SessionId, SessionStats, SessionStatus};
use dalston_core::stage::Stage;
use std::collections::HashSet;
use std::sync::Arc;

/// Parameters for a new real-time session (§4.6, §6.1).
pub struct AllocateRequest {
    pub tenant_id: String,
    pub language: String,
    pub model: String,
    pub encoding: String,
    pub sample_rate: u32,
    pub retention: RetentionDays,
}

#[derive(Clone)]
pub struct SessionRouter<C: Clock> {
    store: SharedStore,
    registry: EngineRegistry<C>,
    catalog: Arc<Catalog>,
    clock: C,
}

impl<C: Clock> SessionRouter<C> {
    pub fn new(store: SharedStore, registry: EngineRegistry<C>, catalog: Arc<Catalog>, clock: C) -> Self {
        Self { store, registry, catalog, clock }
    }

    /// §4.6 `allocate`: pick the least-loaded healthy instance of the
    /// streaming-capable engine that covers `language`/`model`, or a 503
    /// (`EngineUnavailable`/`AtCapacity`) if none qualifies.
    pub fn allocate(&self, req: AllocateRequest) -> Result<RealtimeSession, RouterError> {
        let required = RequiredCapabilities { streaming: true, word_timestamps: false };
        let candidates = self
            .catalog
            .lookup(Stage::Transcribe, &req.language, required)
            .map_err(|_| RouterError::EngineUnavailable(req.model.clone()))?;
        let descriptor = candidates
            .iter()
            .find(|d| d.id.as_str() == req.model || d.aliases.iter().any(|a| a == &req.model))
            .or_else(|| candidates.first())
            .ok_or_else(|| RouterError::EngineUnavailable(req.model.clone()))?;

        let now = self.clock.epoch_ms();
        let live_instances = self.registry.dispatchable_instances_for(&descriptor.id);
        if live_instances.is_empty() {
            return Err(RouterError::EngineUnavailable(descriptor.id.as_str().to_string()));
        }

        let worker_id = {
            let guard = self.store.lock();
            let mut best: Option<(EngineInstanceId, u32)> = None;
            for instance in &live_instances {
                let load = guard
                    .state()
                    .sessions
                    .values()
                    .filter(|s| s.worker_id == instance.id && s.status == SessionStatus::Active)
                    .count() as u32;
                if load >= descriptor.max_concurrency {
                    continue;
                }
                if best.as_ref().map(|(_, best_load)| load < *best_load).unwrap_or(true) {
                    best = Some((instance.id, load));
                }
            }
            best.map(|(id, _)| id).ok_or_else(|| RouterError::AtCapacity {
                engine_id: descriptor.id.as_str().to_string(),
                instance_id: live_instances[0].id.to_string(),
                capacity: descriptor.max_concurrency,
            })?
        };

        let session = RealtimeSession {
            id: SessionId::new(),
            tenant_id: req.tenant_id,
            status: SessionStatus::Active,
            language: req.language,
            model: req.model,
            encoding: req.encoding,
            sample_rate: req.sample_rate,
            worker_id,
            stats: SessionStats::default(),
            started_at_ms: now,
            ended_at_ms: None,
            retention: req.retention,
            purge_after_ms: None,
            purged_at_ms: None,
        };
        self.store.lock().state_mut().insert_session(session.clone());
        tracing::info!(session_id = %session.id, %worker_id, "session allocated");
        Ok(session)
    }

    /// §4.6 `release`: close the session and derive its `purge_after`.
    pub fn release(&self, session_id: SessionId, status: SessionStatus, stats: SessionStats) -> Result<(), RouterError> {
        let mut guard = self.store.lock();
        let now = self.clock.epoch_ms();
        let session = guard
            .state_mut()
            .sessions
            .get_mut(&session_id)
            .ok_or(RouterError::SessionNotFound(session_id.as_uuid()))?;
        if session.status.is_terminal() {
            return Ok(());
        }
        session.stats = stats;
        session.close(status, now);
        session.purge_after_ms = session.retention.purge_after_ms(now);
        Ok(())
    }

    pub fn heartbeat(&self, session_id: SessionId) -> Result<(), RouterError> {
        let guard = self.store.lock();
        guard
            .state()
            .sessions
            .get(&session_id)
            .map(|_| ())
            .ok_or(RouterError::SessionNotFound(session_id.as_uuid()))
    }

    pub fn get(&self, session_id: SessionId) -> Option<RealtimeSession> {
        self.store.lock().state().get_session(&session_id).cloned()
    }

    pub fn list(&self, tenant_id: &str) -> Vec<RealtimeSession> {
        self.store.lock().state().sessions.values().filter(|s| s.tenant_id == tenant_id).cloned().collect()
    }

    /// §4.6 health-monitor tick, second half: interrupt every active
    /// session whose host just flipped unhealthy. Takes the instances
    /// [`EngineRegistry::mark_stale_unhealthy`] just reported, so a
    /// session is only ever interrupted once, right when its host drops.
    pub fn interrupt_sessions_on_unhealthy_instances(&self, newly_unhealthy: &[EngineInstanceId]) -> Vec<SessionId> {
        if newly_unhealthy.is_empty() {
            return Vec::new();
        }
        let mut guard = self.store.lock();
        let now = self.clock.epoch_ms();
        let unhealthy: HashSet<EngineInstanceId> = newly_unhealthy.iter().copied().collect();
        let mut interrupted = Vec::new();
        for session in guard.state_mut().sessions.values_mut() {
            if session.status == SessionStatus::Active && unhealthy.contains(&session.worker_id) {
                session.close(SessionStatus::Interrupted, now);
                interrupted.push(session.id);
            }
        }
        if !interrupted.is_empty() {
            tracing::warn!(count = interrupted.len(), "sessions interrupted by unhealthy host");
        }
        interrupted
    }

    /// Reconcile sessions whose `worker_id` no longer names a registered
    /// instance at all (e.g. the instance deregistered without closing its
    /// sessions first) — invariant (b) guards against two workers ever
    /// claiming the same session, not against a worker vanishing outright.
    pub fn reconcile_orphaned_sessions(&self) -> Vec<SessionId> {
        let mut guard = self.store.lock();
        let now = self.clock.epoch_ms();
        let live: HashSet<EngineInstanceId> = guard.state().engine_instances.keys().copied().collect();
        let mut orphaned = Vec::new();
        for session in guard.state_mut().sessions.values_mut() {
            if session.status == SessionStatus::Active && !live.contains(&session.worker_id) {
                session.close(SessionStatus::Interrupted, now);
                orphaned.push(session.id);
            }
        }
        orphaned
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
