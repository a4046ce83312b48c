// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object storage seam (§4.5 steps 3/5): engines fetch task inputs and
//! publish task outputs by URI through this trait; the core never assumes
//! a particular backend.

mod fs;
mod memory;

pub use fs::FilesystemObjectStore;
pub use memory::InMemoryObjectStore;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Blob storage keyed by opaque URI. Implementations need not interpret
/// the URI scheme; the caller (engine runtime, scheduler) is responsible
/// for generating attempt-scoped or content-addressed URIs so a retried
/// attempt never collides with a prior one (§4.5 idempotence requirement).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, uri: &str, bytes: Vec<u8>) -> Result<(), ObjectStoreError>;
    async fn get(&self, uri: &str) -> Result<Vec<u8>, ObjectStoreError>;
    async fn delete(&self, uri: &str) -> Result<(), ObjectStoreError>;
    async fn exists(&self, uri: &str) -> Result<bool, ObjectStoreError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
