// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{ObjectStore, ObjectStoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// In-process object store for tests and local development. Never durable
/// across a restart.
#[derive(Clone, Default)]
pub struct InMemoryObjectStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, uri: &str, bytes: Vec<u8>) -> Result<(), ObjectStoreError> {
        self.blobs.lock().insert(uri.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, uri: &str) -> Result<Vec<u8>, ObjectStoreError> {
        self.blobs
            .lock()
            .get(uri)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound(uri.to_string()))
    }

    async fn delete(&self, uri: &str) -> Result<(), ObjectStoreError> {
        self.blobs.lock().remove(uri);
        Ok(())
    }

    async fn exists(&self, uri: &str) -> Result<bool, ObjectStoreError> {
        Ok(self.blobs.lock().contains_key(uri))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
