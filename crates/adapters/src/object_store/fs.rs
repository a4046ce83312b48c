// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{ObjectStore, ObjectStoreError};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::Instrument;

/// Filesystem-backed object store for local development. URIs are hashed
/// to a flat filename under `root` rather than interpreted as paths, so an
/// adversarial or malformed URI can't escape `root` via `..` traversal.
#[derive(Clone)]
pub struct FilesystemObjectStore {
    root: PathBuf,
}

impl FilesystemObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, uri: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(uri.as_bytes());
        let digest = hasher.finalize();
        self.root.join(to_hex(&digest))
    }
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(&self, uri: &str, bytes: Vec<u8>) -> Result<(), ObjectStoreError> {
        let span = tracing::info_span!("object_store.put", %uri, size = bytes.len());
        async {
            tokio::fs::create_dir_all(&self.root).await?;
            tokio::fs::write(self.path_for(uri), bytes).await?;
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn get(&self, uri: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let bytes = tokio::fs::read(self.path_for(uri))
            .await
            .map_err(|_| ObjectStoreError::NotFound(uri.to_string()))?;
        tracing::trace!(%uri, size = bytes.len(), "object fetched");
        Ok(bytes)
    }

    async fn delete(&self, uri: &str) -> Result<(), ObjectStoreError> {
        match tokio::fs::remove_file(self.path_for(uri)).await {
            Ok(()) => {
                tracing::trace!(%uri, "object deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, uri: &str) -> Result<bool, ObjectStoreError> {
        Ok(fs_exists(&self.path_for(uri)).await)
    }
}

async fn fs_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
