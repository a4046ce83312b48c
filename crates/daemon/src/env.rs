// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide configuration (§6.6): a [`Config`] loaded from TOML, with
//! CLI-flag and environment-variable overrides layered on top in
//! flag > env > file > default precedence.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("parsing config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

/// Process-wide configuration, covering exactly the §6.6 list.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Broker connection URL. The in-process adapters crate ignores this
    /// (it always constructs an in-memory or filesystem double), but a
    /// real deployment would dial it here.
    #[serde(default = "default_broker_url")]
    pub broker_url: String,
    /// Path to the durable WAL the State Store replays on startup.
    #[serde(default = "default_state_store_path")]
    pub state_store_path: PathBuf,
    /// Path the filesystem object store double roots blobs under.
    #[serde(default = "default_object_storage_root")]
    pub object_storage_root: PathBuf,
    /// Object storage endpoint for a real (non-filesystem) backend.
    #[serde(default)]
    pub object_storage_endpoint: Option<String>,
    #[serde(default)]
    pub object_storage_credentials: Option<String>,
    /// Path to the HCL engine manifest the Catalog loads at startup.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,
    /// This orchestrator replica's identity (§5, §9 replica partitioning).
    #[serde(default = "default_replica_id")]
    pub replica_id: String,
    #[serde(default = "default_engine_heartbeat_ttl_ms")]
    pub engine_heartbeat_ttl_ms: u64,
    #[serde(default = "default_session_heartbeat_ttl_ms")]
    pub session_heartbeat_ttl_ms: u64,
    #[serde(default = "default_retry_cap")]
    pub retry_cap: u32,
    #[serde(default = "default_timeout_floor_s")]
    pub timeout_floor_s: u64,
    #[serde(default = "default_timeout_safety_factor")]
    pub timeout_safety_factor: f64,
    #[serde(default = "default_retention_sweep_interval_s")]
    pub retention_sweep_interval_s: u64,
    /// Wait (default) vs. fail-fast policy when the DAG Builder selects an
    /// engine with no registered instance (§4.2 "Engine unavailable").
    #[serde(default)]
    pub engine_unavailable_fail_fast: bool,
}

fn default_broker_url() -> String {
    "mem://broker".to_string()
}
fn default_state_store_path() -> PathBuf {
    PathBuf::from("dalston.wal")
}
fn default_object_storage_root() -> PathBuf {
    PathBuf::from("dalston-objects")
}
fn default_manifest_path() -> PathBuf {
    PathBuf::from("engines.hcl")
}
fn default_replica_id() -> String {
    "replica-0".to_string()
}
fn default_engine_heartbeat_ttl_ms() -> u64 {
    30_000
}
fn default_session_heartbeat_ttl_ms() -> u64 {
    30_000
}
fn default_retry_cap() -> u32 {
    3
}
fn default_timeout_floor_s() -> u64 {
    60
}
fn default_timeout_safety_factor() -> f64 {
    3.0
}
fn default_retention_sweep_interval_s() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str("").expect("empty document satisfies every #[serde(default)] field")
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Apply CLI-flag / environment overrides on top of the file (or
    /// default) config. Flags win over the file, matching the precedence
    /// `flag > env > file > default` (`clap`'s `env` attribute already
    /// resolves flag-vs-env for each field in [`ConfigArgs`]).
    pub fn apply_overrides(mut self, args: &ConfigArgs) -> Self {
        if let Some(v) = &args.broker_url {
            self.broker_url = v.clone();
        }
        if let Some(v) = &args.state_store_path {
            self.state_store_path = v.clone();
        }
        if let Some(v) = &args.manifest_path {
            self.manifest_path = v.clone();
        }
        if let Some(v) = &args.replica_id {
            self.replica_id = v.clone();
        }
        self
    }
}

/// CLI-flag / environment overrides layered on top of the TOML file.
/// Shared between `dalstond` and `dalston-cli` so both honor the same
/// precedence.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Path to the TOML config file.
    #[arg(long, env = "DALSTON_CONFIG")]
    pub config: Option<PathBuf>,
    #[arg(long, env = "DALSTON_BROKER_URL")]
    pub broker_url: Option<String>,
    #[arg(long, env = "DALSTON_STATE_STORE_PATH")]
    pub state_store_path: Option<PathBuf>,
    #[arg(long, env = "DALSTON_MANIFEST_PATH")]
    pub manifest_path: Option<PathBuf>,
    #[arg(long, env = "DALSTON_REPLICA_ID")]
    pub replica_id: Option<String>,
}

impl ConfigArgs {
    /// Resolve the full [`Config`]: load `--config` (if given), then layer
    /// the remaining flags/env vars on top; fall back to all-defaults when
    /// no config file is given.
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        let base = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        Ok(base.apply_overrides(self))
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
