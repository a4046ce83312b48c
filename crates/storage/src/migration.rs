// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned migration of persisted snapshots (§9 migration note: the
//! retention-days integer model is assumed resolved by the time a snapshot
//! reaches this binary; this is the general mechanism that would carry out
//! such a resolution on an older snapshot).

use serde_json::Value;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("snapshot version {0} is newer than this binary knows how to read (max {1})")]
    TooNew(u32, u32),
    #[error("no migration path registered from version {0} to version {1}")]
    NoPath(u32, u32),
    #[error("malformed snapshot: missing or non-numeric 'v' field")]
    MalformedSnapshot,
}

/// One step in a snapshot version upgrade chain.
pub trait Migration {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError>;
}

/// Ordered collection of migrations, applied one hop at a time until the
/// snapshot reaches the requested target version.
#[derive(Default)]
pub struct MigrationRegistry {
    migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self { migrations: Vec::new() }
    }

    pub fn register(&mut self, migration: Box<dyn Migration>) {
        self.migrations.push(migration);
    }

    pub fn migrate_to(&self, snapshot: Value, target: u32) -> Result<Value, MigrationError> {
        let current = snapshot.get("v").and_then(Value::as_u64).ok_or(MigrationError::MalformedSnapshot)? as u32;

        if current == target {
            return Ok(snapshot);
        }
        if current > target {
            return Err(MigrationError::TooNew(current, target));
        }

        let mut value = snapshot;
        let mut version = current;
        while version != target {
            let step = self
                .migrations
                .iter()
                .find(|m| m.source_version() == version)
                .ok_or(MigrationError::NoPath(current, target))?;
            step.migrate(&mut value)?;
            version = step.target_version();
            if let Some(obj) = value.as_object_mut() {
                obj.insert("v".to_string(), Value::from(version));
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
