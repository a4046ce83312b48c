// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and shutdown (§6.6, §9 recovery): acquire the
//! single-instance lock, recover the State Store from its snapshot/WAL,
//! load the engine catalog, and wire every component together.

use crate::env::Config;
use crate::error::LifecycleError;
use crate::gateway::Gateway;
use crate::purge::RetentionPurger;
use crate::reconcile::{Reconciler, ReconcileSummary};
use crate::registry::EngineRegistry;
use crate::router::SessionRouter;
use crate::scheduler::Scheduler;
use crate::SharedStore;
use dalston_adapters::broker::{Broker, InMemoryBroker};
use dalston_adapters::object_store::{FilesystemObjectStore, ObjectStore};
use dalston_catalog::{manifest, Catalog};
use dalston_core::clock::SystemClock;
use dalston_storage::{MigrationRegistry, StateStore};
use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Everything the process needs on disk, derived from a single state
/// directory (the parent of `state_store_path`) the way the teacher
/// derives its socket/lock/snapshot paths from one `state_dir`.
struct Paths {
    lock_path: PathBuf,
    version_path: PathBuf,
    snapshot_path: PathBuf,
    wal_path: PathBuf,
}

impl Paths {
    fn derive(config: &Config) -> Self {
        let state_dir = config.state_store_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        Paths {
            lock_path: state_dir.join("dalstond.pid"),
            version_path: state_dir.join("dalstond.version"),
            snapshot_path: state_dir.join("dalstond.snapshot.zst"),
            wal_path: config.state_store_path.clone(),
        }
    }
}

/// Every long-lived component the daemon's main loop drives, wired
/// together at startup (C1-C10).
pub struct Daemon {
    pub gateway: Gateway<SystemClock>,
    pub reconciler: Reconciler<SystemClock>,
    pub purger: RetentionPurger<SystemClock>,
    pub registry: EngineRegistry<SystemClock>,
    store: SharedStore,
    config: Config,
    paths: Paths,
    start_time: Instant,
    // Held only to keep the exclusive lock alive; released on drop.
    #[allow(dead_code)]
    lock_file: File,
}

impl Daemon {
    /// Bring up the whole process: acquire the lock, recover state, load
    /// the catalog, and run one reconcile pass before returning.
    pub async fn start(config: Config) -> Result<Self, LifecycleError> {
        let paths = Paths::derive(&config);

        let state_dir = config.state_store_path.parent().unwrap_or_else(|| Path::new("."));
        create_dir(state_dir)?;
        create_dir(&config.object_storage_root)?;
        if let Some(parent) = config.manifest_path.parent() {
            create_dir(parent)?;
        }

        // Acquire the lock before touching anything else owned by the
        // already-running instance, the same ordering the teacher uses so
        // a second `dalstond` never races the first for the WAL.
        let lock_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&paths.lock_path)
            .map_err(|source| LifecycleError::Io { path: paths.lock_path.clone(), source })?;
        lock_file.try_lock_exclusive().map_err(|_| LifecycleError::AlreadyRunning(paths.lock_path.clone()))?;
        write_pid(&lock_file, &paths.lock_path)?;

        std::fs::write(&paths.version_path, env!("CARGO_PKG_VERSION"))
            .map_err(|source| LifecycleError::Io { path: paths.version_path.clone(), source })?;

        let store = open_store(&paths)?;
        let store: SharedStore = Arc::new(parking_lot::Mutex::new(store));

        let descriptors = manifest::load(&config.manifest_path)?;
        let catalog = Arc::new(Catalog::load(descriptors));

        let registry = EngineRegistry::new(store.clone(), SystemClock, config.engine_heartbeat_ttl_ms);
        let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::with_clock(SystemClock));
        let object_store: Arc<dyn ObjectStore> = Arc::new(FilesystemObjectStore::new(config.object_storage_root.clone()));

        let scheduler =
            Scheduler::new(store.clone(), registry.clone(), catalog.clone(), broker, SystemClock, config.retry_cap);
        let router = SessionRouter::new(store.clone(), registry.clone(), catalog, SystemClock);
        let purger = RetentionPurger::new(store.clone(), object_store, SystemClock);
        let reconciler = Reconciler::new(scheduler.clone(), router.clone(), registry.clone());
        let gateway = Gateway::new(scheduler, router, registry.clone());

        tracing::info!(replica_id = %config.replica_id, "dalstond started");

        let daemon =
            Daemon { gateway, reconciler, purger, registry, store, config, paths, start_time: Instant::now(), lock_file };
        daemon.reconciler.run().await.map_err(|e| LifecycleError::Io {
            path: daemon.paths.wal_path.clone(),
            source: std::io::Error::other(e.to_string()),
        })?;
        Ok(daemon)
    }

    /// Run a reconcile pass on demand (e.g. a periodic health-monitor
    /// tick, on top of the one `start` already ran).
    pub async fn reconcile(&self) -> Result<ReconcileSummary, crate::error::SchedulerError> {
        self.reconciler.run().await
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    pub fn replica_id(&self) -> &str {
        &self.config.replica_id
    }

    /// Flush the WAL, snapshot it, and release the process-wide files
    /// this instance owns. The lock file itself is released when `self`
    /// (and its held `File`) drops.
    pub fn shutdown(mut self) -> Result<(), LifecycleError> {
        tracing::info!("dalstond shutting down");
        {
            let mut guard = self.store.lock();
            guard.flush()?;
            guard.save_snapshot(&self.paths.snapshot_path)?;
        }
        if self.paths.version_path.exists() {
            let _ = std::fs::remove_file(&self.paths.version_path);
        }
        if self.paths.lock_path.exists() {
            let _ = std::fs::remove_file(&self.paths.lock_path);
        }
        Ok(())
    }
}

fn create_dir(path: impl AsRef<Path>) -> Result<(), LifecycleError> {
    let path = path.as_ref();
    std::fs::create_dir_all(path).map_err(|source| LifecycleError::Io { path: path.to_path_buf(), source })
}

fn write_pid(lock_file: &File, path: &Path) -> Result<(), LifecycleError> {
    let mut lock_file = lock_file;
    lock_file.set_len(0).map_err(|source| LifecycleError::Io { path: path.to_path_buf(), source })?;
    writeln!(lock_file, "{}", std::process::id()).map_err(|source| LifecycleError::Io { path: path.to_path_buf(), source })
}

fn open_store(paths: &Paths) -> Result<StateStore, LifecycleError> {
    if paths.snapshot_path.exists() {
        let snapshot = StateStore::read_snapshot(&paths.snapshot_path)?;
        let migrations = MigrationRegistry::new();
        let store = StateStore::open_with_snapshot(&paths.wal_path, snapshot, &migrations)?;
        tracing::info!(path = %paths.snapshot_path.display(), "resumed from snapshot");
        Ok(store)
    } else {
        tracing::info!("no snapshot found, replaying the WAL from scratch");
        Ok(StateStore::open(&paths.wal_path, 0)?)
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
