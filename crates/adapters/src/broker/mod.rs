// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker seam (C3, §4.4): two orthogonal services layered on the same
//! backend — the event stream (durable, ordered, consumer-group delivery)
//! and the per-engine-descriptor task queues (FIFO, receive-and-lease).

mod memory;

pub use memory::InMemoryBroker;

use async_trait::async_trait;
use dalston_core::{EngineDescriptorId, EventEnvelope};
use dalston_wire::EngineQueueMessage;
use uuid::Uuid;

pub type DeliveryToken = Uuid;
pub type LeaseToken = Uuid;

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("no such delivery token")]
    UnknownDelivery,
    #[error("no such lease token")]
    UnknownLease,
}

/// One event handed back by [`EventBus::poll`], not yet acked.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredEvent {
    pub token: DeliveryToken,
    pub envelope: EventEnvelope,
}

/// The append-only, ordered event stream, shared by consumer groups
/// (scheduler replicas). Delivery is at-least-once: an unacked delivery
/// becomes visible again to the group once its visibility window elapses.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), BrokerError>;

    /// Poll the next not-yet-acked event for `consumer_group`. The returned
    /// delivery stays invisible to the group for `visibility_seconds`
    /// unless acked first.
    async fn poll(
        &self,
        consumer_group: &str,
        visibility_seconds: u64,
    ) -> Result<Option<DeliveredEvent>, BrokerError>;

    async fn ack(&self, consumer_group: &str, token: DeliveryToken) -> Result<(), BrokerError>;
}

/// One leased message handed back by [`EngineQueue::dequeue_lease`].
#[derive(Debug, Clone, PartialEq)]
pub struct Lease {
    pub token: LeaseToken,
    pub message: EngineQueueMessage,
}

/// Per-engine-descriptor FIFO work queue (§4.4). Dequeue is
/// receive-and-lease: the message is invisible to other dequeuers until
/// acked, nacked, or its lease expires.
#[async_trait]
pub trait EngineQueue: Send + Sync {
    async fn enqueue(
        &self,
        engine_id: &EngineDescriptorId,
        message: EngineQueueMessage,
    ) -> Result<(), BrokerError>;

    async fn dequeue_lease(
        &self,
        engine_id: &EngineDescriptorId,
        lease_seconds: u64,
    ) -> Result<Option<Lease>, BrokerError>;

    async fn ack_lease(&self, token: LeaseToken) -> Result<(), BrokerError>;

    /// Nack: the message becomes visible again at the front of its queue
    /// immediately, for prompt redelivery.
    async fn nack_lease(&self, token: LeaseToken) -> Result<(), BrokerError>;

    /// Push the lease's visibility window out by `lease_seconds` from now,
    /// for an engine still working a long-running task (§4.5 step 7).
    async fn renew_lease(&self, token: LeaseToken, lease_seconds: u64) -> Result<(), BrokerError>;

    /// Release every lease whose TTL has elapsed, making those messages
    /// visible again. Returns the number reaped. Callers run this on a
    /// timer; it also models what a broker would do internally.
    async fn reap_expired_leases(&self) -> Result<usize, BrokerError>;
}

/// The full broker contract (§4.4): event stream plus engine queues.
pub trait Broker: EventBus + EngineQueue {}
impl<T: EventBus + EngineQueue + ?Sized> Broker for T {}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
