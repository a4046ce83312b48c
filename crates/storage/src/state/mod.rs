// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state rebuilt from WAL replay (C2, §4, §6.2).
//!
//! Jobs, tasks, and artifacts are durable: every transition arrives as an
//! [`Event`] and `apply_event` derives the new row state from it. Sessions
//! and engine instances are runtime-only (§3.5, §3.6 — neither is part of
//! the durable event schema); they are mutated directly and never survive
//! a restart, the same way the row only materializes once a caller
//! inserts it directly (see the `JobCreated` handler in [`jobs`]).

mod artifacts;
mod helpers;
mod jobs;
mod tasks;

use crate::StoreError;
use dalston_core::{Artifact, ArtifactId, EngineInstance, EngineInstanceId, Event, Job, JobId, RealtimeSession, SessionId, Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub jobs: HashMap<JobId, Job>,
    pub tasks: HashMap<TaskId, Task>,
    pub artifacts: HashMap<ArtifactId, Artifact>,
    /// Runtime-only: never persisted into a snapshot (§3.6, no session
    /// event exists to replay).
    #[serde(skip)]
    pub sessions: HashMap<SessionId, RealtimeSession>,
    /// Runtime-only: rebuilt from `register` calls as engines reconnect.
    #[serde(skip)]
    pub engine_instances: HashMap<EngineInstanceId, EngineInstance>,
}

impl MaterializedState {
    pub fn get_job(&self, id: &JobId) -> Option<&Job> {
        self.jobs.get(id)
    }

    pub fn get_task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn get_artifact(&self, id: &ArtifactId) -> Option<&Artifact> {
        self.artifacts.get(id)
    }

    pub fn get_session(&self, id: &SessionId) -> Option<&RealtimeSession> {
        self.sessions.get(id)
    }

    pub fn tasks_for_job(&self, job_id: JobId) -> impl Iterator<Item = &Task> {
        self.tasks.values().filter(move |t| t.job_id == job_id)
    }

    pub fn insert_job(&mut self, job: Job) {
        self.jobs.insert(job.id, job);
    }

    /// I1/P1: at most one task row per `(job_id, stage)`. Rejects a second
    /// insert for a stage the job already has a row for instead of
    /// silently duplicating or overwriting it.
    pub fn insert_task(&mut self, task: Task) -> Result<(), StoreError> {
        if self.tasks.values().any(|t| t.job_id == task.job_id && t.stage == task.stage) {
            return Err(StoreError::DuplicateTask { job_id: task.job_id, stage: task.stage });
        }
        self.tasks.insert(task.id, task);
        Ok(())
    }

    pub fn insert_artifact(&mut self, artifact: Artifact) {
        self.artifacts.insert(artifact.id, artifact);
    }

    pub fn insert_session(&mut self, session: RealtimeSession) {
        self.sessions.insert(session.id, session);
    }

    pub fn remove_session(&mut self, id: &SessionId) {
        self.sessions.remove(id);
    }

    pub fn upsert_engine_instance(&mut self, instance: EngineInstance) {
        self.engine_instances.insert(instance.id, instance);
    }

    pub fn remove_engine_instance(&mut self, id: &EngineInstanceId) {
        self.engine_instances.remove(id);
    }

    /// Apply one durable event to derive the next state. All handlers must
    /// be idempotent: replaying the same event twice (immediate application
    /// at submit time, then again during WAL replay after a restart) must
    /// leave the state exactly as a single application would.
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::JobCreated { .. }
            | Event::JobCancelRequested { .. }
            | Event::JobCompleted { .. }
            | Event::JobFailed { .. }
            | Event::JobCancelled { .. } => jobs::apply(self, event),

            Event::TaskReady { .. }
            | Event::TaskStarted { .. }
            | Event::TaskCompleted { .. }
            | Event::TaskFailed { .. }
            | Event::TaskCancelled { .. }
            | Event::TaskHeartbeatExpired { .. } => tasks::apply(self, event),

            Event::ArtifactPurged { .. } => artifacts::apply(self, event),

            Event::Custom => {}
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
