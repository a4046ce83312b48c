// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the worker loop (§4.5, §7).

use dalston_adapters::broker::BrokerError;
use dalston_adapters::object_store::ObjectStoreError;

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("broker: {0}")]
    Broker(#[from] BrokerError),
    #[error("object store: {0}")]
    ObjectStore(#[from] ObjectStoreError),
    #[error("registry: {0}")]
    Registry(#[from] dalston_daemon::registry::RegistryError),
}
