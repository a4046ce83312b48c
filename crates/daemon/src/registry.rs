// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine Registry (C4, §3.5, §4.1 engine selection policy): tracks which
//! engine instances are alive and dispatchable, independent of the static
//! [`dalston_catalog::Catalog`] they incarnate.

use crate::SharedStore;
use dalston_core::clock::Clock;
use dalston_core::engine::{EngineDescriptorId, EngineInstance, EngineInstanceId, InstanceStatus};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("engine instance {0} is not registered")]
    NotFound(Uuid),
}

/// Runtime liveness tracker for engine instances. Backed by the same
/// [`SharedStore`] the scheduler and session router use, since
/// `MaterializedState::engine_instances` is the one source of truth for
/// "which instances exist right now" (§9 "Global state": runtime-only,
/// rebuilt from `register` calls as engines reconnect).
#[derive(Clone)]
pub struct EngineRegistry<C: Clock> {
    store: SharedStore,
    clock: C,
    heartbeat_ttl_ms: u64,
}

impl<C: Clock> EngineRegistry<C> {
    pub fn new(store: SharedStore, clock: C, heartbeat_ttl_ms: u64) -> Self {
        Self { store, clock, heartbeat_ttl_ms }
    }

    /// A fresh instance connects and announces itself (§3.5).
    pub fn register(&self, descriptor_id: EngineDescriptorId, loaded_model: String) -> EngineInstanceId {
        let instance = EngineInstance {
            id: EngineInstanceId::new(),
            descriptor_id,
            heartbeat_at_ms: self.clock.epoch_ms(),
            loaded_model,
            status: InstanceStatus::Available,
        };
        let id = instance.id;
        self.store.lock().state_mut().upsert_engine_instance(instance);
        tracing::info!(instance_id = %id, "engine instance registered");
        id
    }

    pub fn heartbeat(&self, instance_id: EngineInstanceId, status: InstanceStatus) -> Result<(), RegistryError> {
        let mut guard = self.store.lock();
        let instance = guard
            .state_mut()
            .engine_instances
            .get_mut(&instance_id)
            .ok_or(RegistryError::NotFound(instance_id.as_uuid()))?;
        instance.heartbeat_at_ms = self.clock.epoch_ms();
        instance.status = status;
        Ok(())
    }

    pub fn deregister(&self, instance_id: EngineInstanceId) {
        self.store.lock().state_mut().remove_engine_instance(&instance_id);
    }

    pub fn get(&self, instance_id: EngineInstanceId) -> Option<EngineInstance> {
        self.store.lock().state().engine_instances.get(&instance_id).cloned()
    }

    pub fn list(&self) -> Vec<EngineInstance> {
        self.store.lock().state().engine_instances.values().cloned().collect()
    }

    pub fn list_for_descriptor(&self, descriptor_id: &EngineDescriptorId) -> Vec<EngineInstance> {
        self.store
            .lock()
            .state()
            .engine_instances
            .values()
            .filter(|i| &i.descriptor_id == descriptor_id)
            .cloned()
            .collect()
    }

    /// Whether `descriptor_id` currently has at least one alive,
    /// non-unhealthy instance — the dispatch-eligibility test the DAG
    /// Builder and Scheduler apply on top of the Catalog's static
    /// candidate list (§4.1 "preferring registered/healthy engines").
    pub fn has_dispatchable_instance(&self, descriptor_id: &EngineDescriptorId) -> bool {
        let guard = self.store.lock();
        let now = self.clock.epoch_ms();
        guard.state().engine_instances.values().any(|i| {
            &i.descriptor_id == descriptor_id
                && i.is_alive(now, self.heartbeat_ttl_ms)
                && i.status != InstanceStatus::Unhealthy
        })
    }

    /// Alive, non-unhealthy instances of `descriptor_id` — the Session
    /// Router's candidate pool for `allocate` (§4.6).
    pub fn dispatchable_instances_for(&self, descriptor_id: &EngineDescriptorId) -> Vec<EngineInstance> {
        let guard = self.store.lock();
        let now = self.clock.epoch_ms();
        guard
            .state()
            .engine_instances
            .values()
            .filter(|i| {
                &i.descriptor_id == descriptor_id
                    && i.is_alive(now, self.heartbeat_ttl_ms)
                    && i.status != InstanceStatus::Unhealthy
            })
            .cloned()
            .collect()
    }

    /// Mark every instance whose heartbeat has exceeded the TTL as
    /// `Unhealthy` (§4.6 health-monitor tick, first half). Returns the
    /// instances newly marked this tick, so the Session Router can
    /// interrupt whatever sessions they were holding.
    pub fn mark_stale_unhealthy(&self) -> Vec<EngineInstanceId> {
        let mut guard = self.store.lock();
        let now = self.clock.epoch_ms();
        let ttl = self.heartbeat_ttl_ms;
        let mut newly_unhealthy = Vec::new();
        for instance in guard.state_mut().engine_instances.values_mut() {
            if !instance.is_alive(now, ttl) && instance.status != InstanceStatus::Unhealthy {
                instance.status = InstanceStatus::Unhealthy;
                newly_unhealthy.push(instance.id);
            }
        }
        if !newly_unhealthy.is_empty() {
            tracing::warn!(count = newly_unhealthy.len(), "engine instances marked unhealthy on stale heartbeat");
        }
        newly_unhealthy
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
