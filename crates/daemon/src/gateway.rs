// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway facade (C10, §4.8): the one surface the (out-of-scope) HTTP/WS
//! layer is meant to call into. Every method here is a thin translation
//! from [`dalston_wire`] DTOs to the Scheduler/Registry/Router calls that
//! do the actual work — no orchestration logic lives in this module.

use crate::error::{RouterError, SchedulerError};
use crate::registry::EngineRegistry;
use crate::router::{AllocateRequest, SessionRouter};
use crate::scheduler::{CancelOutcome, Scheduler};
use dalston_core::clock::Clock;
use dalston_core::engine::InstanceStatus;
use dalston_core::job::JobParams;
use dalston_wire::{EngineRecord, JobRecord, SessionTicket, SubmitRequest, TaskRecord};
use uuid::Uuid;

/// The eight operations `§4.8` enumerates, fronting the Scheduler, the
/// Session Router, and the Engine Registry behind wire-shaped types.
#[derive(Clone)]
pub struct Gateway<C: Clock> {
    scheduler: Scheduler<C>,
    router: SessionRouter<C>,
    registry: EngineRegistry<C>,
}

impl<C: Clock> Gateway<C> {
    pub fn new(scheduler: Scheduler<C>, router: SessionRouter<C>, registry: EngineRegistry<C>) -> Self {
        Self { scheduler, router, registry }
    }

    /// `POST /v1/audio/transcriptions` (§6.1).
    pub async fn submit(&self, req: SubmitRequest) -> Result<JobRecord, SchedulerError> {
        let params = JobParams {
            tenant_id: req.tenant_id,
            source_uri: req.source_uri,
            model: req.model,
            language: req.language,
            speaker_detection: req.speaker_detection,
            timestamps_granularity: req.timestamps_granularity,
            pii_detection: req.pii_detection,
            redact_pii_audio: req.redact_pii_audio,
            pii_redaction_mode: req.pii_redaction_mode,
            retention: req.retention_policy.unwrap_or(dalston_core::job::RetentionDays::days(30)),
            correlation_id: req.correlation_id,
        };
        let job_id = self.scheduler.submit(params).await?;
        let job = self.scheduler.query(job_id).ok_or(SchedulerError::JobNotFound(job_id.as_uuid()))?;
        Ok(JobRecord::from(&job))
    }

    /// `GET /v1/audio/transcriptions/{id}` (§6.1, §4.8 `get_job`).
    pub fn get_job(&self, job_id: Uuid) -> Option<JobRecord> {
        self.scheduler.query(job_id.into()).as_ref().map(JobRecord::from)
    }

    /// `GET /v1/audio/transcriptions` (§4.8 `list_jobs`).
    pub fn list_jobs(&self, tenant_id: &str) -> Vec<JobRecord> {
        self.scheduler.list(tenant_id).iter().map(JobRecord::from).collect()
    }

    /// `DELETE /v1/audio/transcriptions/{id}` (§4.8 `cancel_job`).
    pub fn cancel_job(&self, job_id: Uuid) -> Result<CancelOutcome, SchedulerError> {
        self.scheduler.cancel(job_id.into())
    }

    /// `GET /v1/audio/transcriptions/{id}/tasks` (§4.8 `list_tasks`).
    pub fn list_tasks(&self, job_id: Uuid) -> Vec<TaskRecord> {
        self.scheduler.list_tasks(job_id.into()).iter().map(TaskRecord::from).collect()
    }

    /// `GET /v1/engines` (§4.8 `list_engines`): static catalog entries
    /// rolled up with the registry's live instance counts.
    pub fn list_engines(&self) -> Vec<EngineRecord> {
        self.scheduler
            .catalog()
            .all()
            .map(|descriptor| {
                let instances = self.registry.list_for_descriptor(&descriptor.id);
                let available_instances =
                    instances.iter().filter(|i| i.status == InstanceStatus::Available).count() as u32;
                EngineRecord {
                    id: descriptor.id.clone(),
                    stage: descriptor.stage,
                    languages: descriptor.languages.clone(),
                    capabilities: descriptor.capabilities,
                    rtf: descriptor.rtf,
                    max_concurrency: descriptor.max_concurrency,
                    aliases: descriptor.aliases.clone(),
                    live_instances: instances.len() as u32,
                    available_instances,
                }
            })
            .collect()
    }

    /// `POST /v1/realtime/sessions` (§4.6, §4.8 `allocate_session`).
    pub fn allocate_session(&self, req: AllocateRequest) -> Result<SessionTicket, RouterError> {
        let session = self.router.allocate(req)?;
        Ok(SessionTicket { session_id: session.id, worker_id: session.worker_id, ticket: session.id.to_string() })
    }

    /// `DELETE /v1/realtime/sessions/{id}` (§4.8 `release_session`).
    pub fn release_session(
        &self,
        session_id: Uuid,
        status: dalston_core::session::SessionStatus,
        stats: dalston_core::session::SessionStats,
    ) -> Result<(), RouterError> {
        self.router.release(session_id.into(), status, stats)
    }

    /// Drain the event bus (engine `task.started`/`task.completed`/
    /// `task.failed` reports, plus anything `submit` queued) into the
    /// Scheduler, up to `max_batch` events. Not one of `§4.8`'s eight
    /// operations — this is what the daemon's main loop drives on its tick,
    /// outside the gateway's public wire surface, but it belongs next to
    /// the collaborator the tick loop otherwise has no handle to.
    pub async fn pump_events(&self, visibility_seconds: u64, max_batch: usize) -> Result<usize, SchedulerError> {
        let mut processed = 0;
        while processed < max_batch {
            if !self.scheduler.pump_event(visibility_seconds).await? {
                break;
            }
            processed += 1;
        }
        Ok(processed)
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
