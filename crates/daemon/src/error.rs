// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the orchestrator's scheduling/routing machinery. These
//! map onto [`dalston_core::ErrorKind`] (§7) so retry policy and
//! user-facing scrubbing stay written once, against the kind.

use dalston_core::error::ErrorKind;
use dalston_storage::StoreError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("job {0} not found")]
    JobNotFound(Uuid),
    #[error("task {0} not found")]
    TaskNotFound(Uuid),
    #[error("engine {0} not found in catalog")]
    EngineNotFound(String),
    #[error("no healthy instance registered for engine {0}")]
    EngineUnavailable(String),
    #[error("no engine in the catalog supports language {0}")]
    UnsupportedLanguage(String),
    #[error("job {job_id} is already in a terminal state")]
    JobAlreadyTerminal { job_id: Uuid },
    #[error("lease {0} does not match the task's current owner")]
    LeaseMismatch(Uuid),
    #[error("pipeline would require more than {max} channels")]
    TooManyChannels { max: usize },
    #[error("catalog validation failed: {0}")]
    Catalog(#[from] dalston_catalog::error::CatalogValidationError),
    #[error("state store: {0}")]
    Store(#[from] StoreError),
    #[error("broker: {0}")]
    Broker(#[from] dalston_adapters::broker::BrokerError),
    #[error("internal scheduler defect: {0}")]
    Internal(String),
}

impl SchedulerError {
    /// Maps to the shared [`ErrorKind`] taxonomy (§7) so callers outside
    /// this crate (the Gateway, the CLI) can reason about retryability and
    /// user-visibility without matching on every variant. Lookup failures
    /// that have no analogue in `ErrorKind` (the taxonomy is about task
    /// *execution* failures, not query misses) fall back to `Internal`,
    /// the most conservative (never retried, never shown verbatim) kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchedulerError::EngineUnavailable(_) => ErrorKind::EngineUnavailable,
            SchedulerError::Catalog(_) | SchedulerError::UnsupportedLanguage(_) => {
                ErrorKind::CatalogValidation
            }
            SchedulerError::Store(_) | SchedulerError::Broker(_) => ErrorKind::TransientIo,
            SchedulerError::JobNotFound(_)
            | SchedulerError::TaskNotFound(_)
            | SchedulerError::EngineNotFound(_)
            | SchedulerError::JobAlreadyTerminal { .. }
            | SchedulerError::LeaseMismatch(_)
            | SchedulerError::TooManyChannels { .. }
            | SchedulerError::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("session {0} not found")]
    SessionNotFound(Uuid),
    #[error("no healthy instance registered for engine {0}")]
    EngineUnavailable(String),
    #[error("engine {engine_id} instance {instance_id} is at capacity ({capacity})")]
    AtCapacity { engine_id: String, instance_id: String, capacity: u32 },
    #[error("state store: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum PurgeError {
    #[error("state store: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("another dalstond instance is already running (lock held on {0})")]
    AlreadyRunning(std::path::PathBuf),
    #[error("io error at {path}: {source}")]
    Io { path: std::path::PathBuf, source: std::io::Error },
    #[error("state store: {0}")]
    Store(#[from] StoreError),
    #[error("config: {0}")]
    Config(#[from] crate::env::ConfigError),
    #[error("engine manifest: {0}")]
    Manifest(#[from] dalston_catalog::manifest::ManifestError),
}
