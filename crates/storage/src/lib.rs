// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dalston-storage: the durable WAL, the materialized state it replays
//! into, and versioned snapshot migration (C2, §4, §6.2, §9).

pub mod migration;
pub mod state;
pub mod wal;

pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use state::MaterializedState;
pub use wal::{Wal, WalEntry, WalError};

use dalston_core::{Event, JobId, Stage};
use serde_json::Value;
use std::path::Path;

/// Snapshot format version this binary writes. Bump whenever
/// [`MaterializedState`]'s shape changes in a way [`MigrationRegistry`]
/// needs to bridge.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Wal(#[from] WalError),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    /// I1/P1: at most one task row per `(job_id, stage)`. Raised instead of
    /// silently overwriting or duplicating a row so the caller (a
    /// redelivered or replica-duplicated `job.created`, per §4.3 step 2)
    /// can treat it as "the loser aborts and reruns on the persisted graph".
    #[error("job {job_id} already has a task for stage {stage}")]
    DuplicateTask { job_id: JobId, stage: Stage },
}

/// The State Store: a durable WAL plus the state it materializes (C2).
///
/// Every mutation is applied to `state` twice over its lifetime — once
/// immediately at submit time for read-your-writes visibility, and once
/// more during [`Self::open`]'s WAL replay after a restart. `apply_event`
/// is idempotent, so both applications converge to the same state.
pub struct StateStore {
    wal: Wal,
    state: MaterializedState,
}

impl StateStore {
    /// Open (or create) the WAL at `wal_path` and replay every entry past
    /// `processed_seq` into a fresh [`MaterializedState`].
    pub fn open(wal_path: impl AsRef<Path>, processed_seq: u64) -> Result<Self, StoreError> {
        let mut wal = Wal::open(wal_path, processed_seq)?;
        let mut state = MaterializedState::default();
        while let Some(entry) = wal.next_unprocessed()? {
            state.apply_event(&entry.event);
            wal.mark_processed(entry.seq);
        }
        Ok(Self { wal, state })
    }

    /// Resume from a snapshot instead of a full WAL replay: restores
    /// `state` from `snapshot`, migrated up to [`SNAPSHOT_VERSION`] if
    /// needed, then replays only the entries written since it was taken.
    pub fn open_with_snapshot(
        wal_path: impl AsRef<Path>,
        snapshot: Value,
        migrations: &MigrationRegistry,
    ) -> Result<Self, StoreError> {
        let migrated = migrations.migrate_to(snapshot, SNAPSHOT_VERSION)?;
        let processed_seq = migrated.get("seq").and_then(Value::as_u64).unwrap_or(0);
        let state: MaterializedState = serde_json::from_value(migrated.get("state").cloned().unwrap_or(Value::Null))?;

        let mut wal = Wal::open(wal_path, processed_seq)?;
        let mut state = state;
        while let Some(entry) = wal.next_unprocessed()? {
            state.apply_event(&entry.event);
            wal.mark_processed(entry.seq);
        }
        Ok(Self { wal, state })
    }

    pub fn state(&self) -> &MaterializedState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MaterializedState {
        &mut self.state
    }

    /// Append `event` to the WAL and apply it to `state` for immediate
    /// visibility, flushing if the WAL's flush policy says it's due.
    pub fn append(&mut self, event: Event) -> Result<u64, StoreError> {
        let seq = self.wal.append(&event)?;
        self.state.apply_event(&event);
        if self.wal.needs_flush() {
            self.wal.flush()?;
        }
        Ok(seq)
    }

    pub fn flush(&mut self) -> Result<(), StoreError> {
        Ok(self.wal.flush()?)
    }

    /// Serialize `{v, seq, state}` (§9 migration note format).
    pub fn snapshot(&self) -> Result<Value, StoreError> {
        let mut doc = serde_json::json!({
            "v": SNAPSHOT_VERSION,
            "seq": self.wal.write_seq(),
        });
        doc["state"] = serde_json::to_value(&self.state)?;
        Ok(doc)
    }

    /// Write a zstd-compressed snapshot to `path`, then drop every WAL
    /// entry the snapshot now covers.
    pub fn save_snapshot(&mut self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let doc = self.snapshot()?;
        let json = serde_json::to_vec(&doc)?;
        let compressed = zstd::encode_all(json.as_slice(), 0).map_err(StoreError::Io)?;
        std::fs::write(path, compressed)?;
        self.wal.truncate_before(self.wal.processed_seq().saturating_add(1))?;
        Ok(())
    }

    /// Read a zstd-compressed snapshot previously written by
    /// [`Self::save_snapshot`] back into a JSON document.
    pub fn read_snapshot(path: impl AsRef<Path>) -> Result<Value, StoreError> {
        let compressed = std::fs::read(path)?;
        let json = zstd::decode_all(compressed.as_slice()).map_err(StoreError::Io)?;
        Ok(serde_json::from_slice(&json)?)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
