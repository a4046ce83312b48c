// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{BrokerError, DeliveredEvent, DeliveryToken, EngineQueue, EventBus, Lease, LeaseToken};
use async_trait::async_trait;
use dalston_core::{Clock, EngineDescriptorId, EventEnvelope, SystemClock};
use dalston_wire::EngineQueueMessage;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

struct InflightEvent {
    group: String,
    offset: usize,
    visible_after_ms: u64,
}

#[derive(Default)]
struct EventBusState {
    log: Vec<EventEnvelope>,
    next_offset: HashMap<String, usize>,
    inflight: HashMap<DeliveryToken, InflightEvent>,
}

struct InflightLease {
    engine_id: EngineDescriptorId,
    message: EngineQueueMessage,
    visible_after_ms: u64,
}

#[derive(Default)]
struct QueueState {
    queues: HashMap<EngineDescriptorId, VecDeque<EngineQueueMessage>>,
    inflight: HashMap<LeaseToken, InflightLease>,
}

/// In-process broker double implementing both halves of C3 (§4.4). Not
/// durable across a restart — see [`crate::object_store::InMemoryObjectStore`]
/// for the analogous object-store double.
pub struct InMemoryBroker<C: Clock = SystemClock> {
    clock: C,
    events: Mutex<EventBusState>,
    queues: Mutex<QueueState>,
}

impl InMemoryBroker<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryBroker<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryBroker<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock, events: Mutex::new(EventBusState::default()), queues: Mutex::new(QueueState::default()) }
    }
}

#[async_trait]
impl<C: Clock> EventBus for InMemoryBroker<C> {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), BrokerError> {
        self.events.lock().log.push(envelope);
        Ok(())
    }

    async fn poll(
        &self,
        consumer_group: &str,
        visibility_seconds: u64,
    ) -> Result<Option<DeliveredEvent>, BrokerError> {
        let now_ms = self.clock.epoch_ms();
        let mut state = self.events.lock();

        if let Some((&expired_token, _)) = state
            .inflight
            .iter()
            .find(|(_, inflight)| inflight.group == consumer_group && inflight.visible_after_ms <= now_ms)
        {
            let inflight = state.inflight.remove(&expired_token).expect("found above");
            let envelope = state.log[inflight.offset].clone();
            let new_token = Uuid::new_v4();
            let visible_after_ms = now_ms + visibility_seconds * 1_000;
            state.inflight.insert(
                new_token,
                InflightEvent { group: consumer_group.to_string(), offset: inflight.offset, visible_after_ms },
            );
            return Ok(Some(DeliveredEvent { token: new_token, envelope }));
        }

        let offset = *state.next_offset.get(consumer_group).unwrap_or(&0);
        if offset >= state.log.len() {
            return Ok(None);
        }
        let envelope = state.log[offset].clone();
        let token = Uuid::new_v4();
        let visible_after_ms = now_ms + visibility_seconds * 1_000;
        state.next_offset.insert(consumer_group.to_string(), offset + 1);
        state
            .inflight
            .insert(token, InflightEvent { group: consumer_group.to_string(), offset, visible_after_ms });
        Ok(Some(DeliveredEvent { token, envelope }))
    }

    async fn ack(&self, consumer_group: &str, token: DeliveryToken) -> Result<(), BrokerError> {
        let mut state = self.events.lock();
        match state.inflight.get(&token) {
            Some(inflight) if inflight.group == consumer_group => {
                state.inflight.remove(&token);
                Ok(())
            }
            _ => Err(BrokerError::UnknownDelivery),
        }
    }
}

#[async_trait]
impl<C: Clock> EngineQueue for InMemoryBroker<C> {
    async fn enqueue(
        &self,
        engine_id: &EngineDescriptorId,
        message: EngineQueueMessage,
    ) -> Result<(), BrokerError> {
        self.queues.lock().queues.entry(engine_id.clone()).or_default().push_back(message);
        Ok(())
    }

    async fn dequeue_lease(
        &self,
        engine_id: &EngineDescriptorId,
        lease_seconds: u64,
    ) -> Result<Option<Lease>, BrokerError> {
        let now_ms = self.clock.epoch_ms();
        let mut state = self.queues.lock();
        let Some(message) = state.queues.get_mut(engine_id).and_then(VecDeque::pop_front) else {
            return Ok(None);
        };
        let token = Uuid::new_v4();
        let visible_after_ms = now_ms + lease_seconds * 1_000;
        state.inflight.insert(
            token,
            InflightLease { engine_id: engine_id.clone(), message: message.clone(), visible_after_ms },
        );
        Ok(Some(Lease { token, message }))
    }

    async fn ack_lease(&self, token: LeaseToken) -> Result<(), BrokerError> {
        let mut state = self.queues.lock();
        state.inflight.remove(&token).map(|_| ()).ok_or(BrokerError::UnknownLease)
    }

    async fn nack_lease(&self, token: LeaseToken) -> Result<(), BrokerError> {
        let mut state = self.queues.lock();
        let inflight = state.inflight.remove(&token).ok_or(BrokerError::UnknownLease)?;
        state.queues.entry(inflight.engine_id).or_default().push_front(inflight.message);
        Ok(())
    }

    async fn renew_lease(&self, token: LeaseToken, lease_seconds: u64) -> Result<(), BrokerError> {
        let now_ms = self.clock.epoch_ms();
        let mut state = self.queues.lock();
        let inflight = state.inflight.get_mut(&token).ok_or(BrokerError::UnknownLease)?;
        inflight.visible_after_ms = now_ms + lease_seconds * 1_000;
        Ok(())
    }

    async fn reap_expired_leases(&self) -> Result<usize, BrokerError> {
        let now_ms = self.clock.epoch_ms();
        let mut state = self.queues.lock();
        let expired: Vec<LeaseToken> = state
            .inflight
            .iter()
            .filter(|(_, inflight)| inflight.visible_after_ms <= now_ms)
            .map(|(token, _)| *token)
            .collect();
        let count = expired.len();
        for token in expired {
            if let Some(inflight) = state.inflight.remove(&token) {
                tracing::warn!(engine_id = %inflight.engine_id, task_id = %inflight.message.task_id, "lease expired, requeued");
                state.queues.entry(inflight.engine_id).or_default().push_front(inflight.message);
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
