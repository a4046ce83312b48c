// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! dalston-adapters: the seams the orchestrator core treats as external
//! collaborators — object storage (blob fetch/put) and the broker (event
//! stream + per-engine queues, C3/§4.4) — plus in-memory test doubles and
//! filesystem/local-process implementations suitable for development.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod broker;
pub mod object_store;

pub use broker::{
    Broker, BrokerError, DeliveredEvent, DeliveryToken, EngineQueue, EventBus, InMemoryBroker,
    LeaseToken,
};
pub use object_store::{FilesystemObjectStore, InMemoryObjectStore, ObjectStore, ObjectStoreError};
