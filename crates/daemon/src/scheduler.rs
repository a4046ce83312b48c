// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler (C6, §4.3): the single-writer, event-driven state machine
//! that turns job/task lifecycle events into task rows, engine-queue
//! dispatches, and job-state transitions.

use crate::dag;
use crate::error::SchedulerError;
use crate::registry::EngineRegistry;
use crate::SharedStore;
use dalston_adapters::broker::Broker;
use dalston_catalog::Catalog;
use dalston_core::clock::Clock;
use dalston_core::event::{Event, EventEnvelope};
use dalston_core::job::{Job, JobParams, JobStatus};
use dalston_core::stage::Stage;
use dalston_core::task::{ArtifactRef, Task, TaskId, TaskStatus};
use dalston_storage::state::MaterializedState;
use dalston_storage::StoreError;
use dalston_wire::{EngineQueueInput, EngineQueueMessage};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Accepted,
    AlreadyTerminal,
}

/// The scheduler's collaborators (C6, §4.3). Cloning is cheap: every field
/// is an `Arc`/`Clone`-cheap handle onto process-wide shared state.
#[derive(Clone)]
pub struct Scheduler<C: Clock> {
    store: SharedStore,
    registry: EngineRegistry<C>,
    catalog: Arc<Catalog>,
    broker: Arc<dyn Broker>,
    clock: C,
    retry_cap: u32,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(
        store: SharedStore,
        registry: EngineRegistry<C>,
        catalog: Arc<Catalog>,
        broker: Arc<dyn Broker>,
        clock: C,
        retry_cap: u32,
    ) -> Self {
        Self { store, registry, catalog, broker, clock, retry_cap }
    }

    /// §4.3 `submit`: validate against the catalog, persist the job, emit
    /// `job.created`. Idempotent on `correlation_id` (L1): a resubmission
    /// carrying a correlation ID already seen for this tenant returns the
    /// existing job id instead of creating a duplicate.
    pub async fn submit(&self, params: JobParams) -> Result<dalston_core::job::JobId, SchedulerError> {
        if let Some(correlation_id) = params.correlation_id.clone() {
            if let Some(existing) = self.find_by_correlation(&params.tenant_id, &correlation_id) {
                tracing::info!(job_id = %existing, %correlation_id, "submit deduplicated by correlation id");
                return Ok(existing);
            }
        }

        let job_id = dalston_core::job::JobId::new();
        let job = Job::new(job_id, params, self.clock.epoch_ms());

        // Catalog validation error (§4.2): raised synchronously, before the
        // job is ever persisted. The task list itself is discarded here;
        // the real build happens once `job.created` is processed, so a
        // concurrent replica that double-processes the event converges on
        // the same graph rather than trusting this preview copy.
        dag::build_plan(&job, &self.catalog, &self.registry)?;

        let correlation_id = job.params.correlation_id.clone();
        let envelope = {
            let mut guard = self.store.lock();
            guard.state_mut().insert_job(job);
            let event = Event::JobCreated { job_id, correlation_id: correlation_id.clone() };
            let seq = guard.append(event.clone())?;
            EventEnvelope { event_id: seq, timestamp_ms: self.clock.epoch_ms(), correlation_id, payload: event }
        };
        self.broker.publish(envelope).await?;
        Ok(job_id)
    }

    fn find_by_correlation(&self, tenant_id: &str, correlation_id: &str) -> Option<dalston_core::job::JobId> {
        self.store
            .lock()
            .state()
            .jobs
            .values()
            .find(|j| j.params.tenant_id == tenant_id && j.params.correlation_id.as_deref() == Some(correlation_id))
            .map(|j| j.id)
    }

    pub fn query(&self, job_id: dalston_core::job::JobId) -> Option<Job> {
        self.store.lock().state().get_job(&job_id).cloned()
    }

    /// The static engine catalog this scheduler validates submissions
    /// against — exposed so the Gateway's `list_engines` can roll it up
    /// with the registry's live instance counts without duplicating it.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn list(&self, tenant_id: &str) -> Vec<Job> {
        self.store.lock().state().jobs.values().filter(|j| j.params.tenant_id == tenant_id).cloned().collect()
    }

    pub fn list_tasks(&self, job_id: dalston_core::job::JobId) -> Vec<Task> {
        self.store.lock().state().tasks_for_job(job_id).cloned().collect()
    }

    /// §4.3 `cancel`: `running` → `cancelling`, or a no-op report if the
    /// job is already terminal.
    pub async fn cancel(&self, job_id: dalston_core::job::JobId) -> Result<CancelOutcome, SchedulerError> {
        let job = self
            .store
            .lock()
            .state()
            .get_job(&job_id)
            .cloned()
            .ok_or_else(|| SchedulerError::JobNotFound(job_id.as_uuid()))?;

        if job.is_terminal() {
            return Ok(CancelOutcome::AlreadyTerminal);
        }

        let envelope = {
            let mut guard = self.store.lock();
            let event = Event::JobCancelRequested { job_id };
            let seq = guard.append(event.clone())?;
            EventEnvelope { event_id: seq, timestamp_ms: self.clock.epoch_ms(), correlation_id: None, payload: event }
        };
        self.broker.publish(envelope).await?;
        Ok(CancelOutcome::Accepted)
    }

    /// Core algorithm (§4.3 steps 2-7): dispatch on the incoming event's
    /// payload, then recompute job progress/current_stage.
    pub async fn handle_event(&self, envelope: &EventEnvelope) -> Result<(), SchedulerError> {
        let job_id = match envelope.payload.job_id() {
            Some(id) => id,
            None => return Ok(()),
        };

        match &envelope.payload {
            Event::JobCreated { .. } => self.on_job_created(job_id).await?,
            Event::TaskStarted { task_id, instance_id, lease_deadline_ms, .. } => {
                self.on_task_started(job_id, *task_id, *instance_id, *lease_deadline_ms)?
            }
            Event::TaskCompleted { task_id, instance_id, outputs, .. } => {
                self.on_task_completed(job_id, *task_id, *instance_id, outputs.clone()).await?
            }
            Event::TaskFailed { task_id, instance_id, error, .. } => {
                self.on_task_failed(job_id, *task_id, *instance_id, error.clone()).await?
            }
            Event::TaskHeartbeatExpired { task_id, .. } => self.on_heartbeat_expired(job_id, *task_id).await?,
            Event::JobCancelRequested { .. } => self.on_cancel_requested(job_id).await?,
            _ => {}
        }

        self.recompute_progress(job_id);
        Ok(())
    }

    /// The consumer group this replica's Scheduler reads the event bus
    /// under (§5 "multi-consumer group on the event stream"). A single
    /// group name since this binary runs one scheduler per process; N
    /// replicas partitioning the same group is the broker's concern, not
    /// this crate's.
    pub const CONSUMER_GROUP: &'static str = "scheduler";

    /// Drain one event off the bus and process it, if one is waiting.
    /// Returns `false` when the bus is empty, so the caller's drive loop
    /// (`main.rs`) knows to stop polling until the next tick. Acks before
    /// handling: a panic or crash mid-handling should not redeliver an
    /// event `handle_event` already started mutating state for — restart
    /// recovery for that case is `reconcile`'s job, not redelivery's.
    pub async fn pump_event(&self, visibility_seconds: u64) -> Result<bool, SchedulerError> {
        let Some(delivered) = self.broker.poll(Self::CONSUMER_GROUP, visibility_seconds).await? else {
            return Ok(false);
        };
        self.broker.ack(Self::CONSUMER_GROUP, delivered.token).await?;
        self.handle_event(&delivered.envelope).await?;
        Ok(true)
    }

    /// An engine instance reports it has leased a task (§4.5 step 2). This
    /// is what makes the task's `lease_holder` match the reporting
    /// instance, so the I2 lease check in `on_task_completed`/
    /// `on_task_failed` accepts its eventual report; a stale duplicate
    /// delivery (same instance, already `running`) is a no-op rather than
    /// bumping `attempt` again.
    fn on_task_started(
        &self,
        job_id: dalston_core::job::JobId,
        task_id: TaskId,
        instance_id: dalston_core::engine::EngineInstanceId,
        lease_deadline_ms: u64,
    ) -> Result<(), SchedulerError> {
        let mut guard = self.store.lock();
        let event = Event::TaskStarted { job_id, task_id, instance_id, lease_deadline_ms };
        guard.append(event)?;
        Ok(())
    }

    /// Step 2.
    async fn on_job_created(&self, job_id: dalston_core::job::JobId) -> Result<(), SchedulerError> {
        let job = self
            .store
            .lock()
            .state()
            .get_job(&job_id)
            .cloned()
            .ok_or_else(|| SchedulerError::JobNotFound(job_id.as_uuid()))?;

        let tasks = dag::build_plan(&job, &self.catalog, &self.registry)?;

        let ready: Vec<Task> = {
            let mut guard = self.store.lock();
            for task in &tasks {
                match guard.state_mut().insert_task(task.clone()) {
                    Ok(()) => {}
                    // I1/P1: at most one task row per (job_id, stage). A
                    // redelivered or replica-duplicated `job.created` (§4.4
                    // is at-least-once) finds this job's graph already
                    // persisted; the loser aborts here and leaves the
                    // winner's graph as the one true plan rather than
                    // building a second one.
                    Err(StoreError::DuplicateTask { .. }) => return Ok(()),
                    Err(err) => return Err(SchedulerError::Store(err)),
                }
            }
            let job_mut = guard
                .state_mut()
                .jobs
                .get_mut(&job_id)
                .ok_or_else(|| SchedulerError::JobNotFound(job_id.as_uuid()))?;
            job_mut.started_at_ms = Some(self.clock.epoch_ms());
            let _ = job_mut.transition(JobStatus::Running);
            tasks.iter().filter(|t| t.depends_on.is_empty()).cloned().collect()
        };

        for task in ready {
            self.mark_ready_and_dispatch(&job, &task).await?;
        }
        Ok(())
    }

    /// Step 3.
    async fn on_task_completed(
        &self,
        job_id: dalston_core::job::JobId,
        task_id: TaskId,
        instance_id: dalston_core::engine::EngineInstanceId,
        outputs: Vec<ArtifactRef>,
    ) -> Result<(), SchedulerError> {
        let owns_lease = self
            .store
            .lock()
            .state()
            .get_task(&task_id)
            .map(|t| t.lease_matches(instance_id))
            .unwrap_or(false);
        if !owns_lease {
            tracing::warn!(%task_id, %instance_id, "discarding task.completed from a non-owning lease");
            return Ok(());
        }

        let (job, merge_completed) = {
            let mut guard = self.store.lock();
            let attempt = guard.state().get_task(&task_id).map(|t| t.attempt).unwrap_or(0);
            let event = Event::TaskCompleted { job_id, task_id, attempt, instance_id, outputs };
            guard.append(event)?;
            let job = guard.state().get_job(&job_id).cloned().ok_or_else(|| SchedulerError::JobNotFound(job_id.as_uuid()))?;
            let stage = guard.state().get_task(&task_id).map(|t| t.stage);
            let merge_completed = stage == Some(Stage::Merge);
            (job, merge_completed)
        };

        if merge_completed {
            self.finalize_completed_job(job_id).await?;
            return Ok(());
        }

        let newly_ready = {
            let guard = self.store.lock();
            newly_ready_tasks(guard.state(), job_id)
        };
        for task in newly_ready {
            self.mark_ready_and_dispatch(&job, &task).await?;
        }
        Ok(())
    }

    /// Step 4. Retries apply to transient failures; a `TaskFailed` *event*
    /// is only ever recorded once the retry cap is exhausted — while
    /// retries remain, the task is quietly reset to `ready` and
    /// re-dispatched without a durable terminal-failure record (§4.3
    /// retry policy).
    async fn on_task_failed(
        &self,
        job_id: dalston_core::job::JobId,
        task_id: TaskId,
        instance_id: dalston_core::engine::EngineInstanceId,
        error: dalston_core::task::TaskError,
    ) -> Result<(), SchedulerError> {
        let (owns_lease, attempt) = {
            let guard = self.store.lock();
            match guard.state().get_task(&task_id) {
                Some(t) => (t.lease_matches(instance_id), t.attempt),
                None => (false, 0),
            }
        };
        if !owns_lease {
            tracing::warn!(%task_id, %instance_id, "discarding task.failed from a non-owning lease");
            return Ok(());
        }

        let should_retry = error.retryable && attempt < self.retry_cap;
        if should_retry {
            tracing::info!(%task_id, attempt, cap = self.retry_cap, "retrying failed task");
            let (job, task) = {
                let mut guard = self.store.lock();
                let task_mut = guard
                    .state_mut()
                    .tasks
                    .get_mut(&task_id)
                    .ok_or_else(|| SchedulerError::TaskNotFound(task_id.as_uuid()))?;
                task_mut.status = TaskStatus::Ready;
                task_mut.lease_holder = None;
                task_mut.lease_deadline_ms = None;
                let task = task_mut.clone();
                let job = guard.state().get_job(&job_id).cloned().ok_or_else(|| SchedulerError::JobNotFound(job_id.as_uuid()))?;
                (job, task)
            };
            self.dispatch(&job, &task).await?;
            return Ok(());
        }

        tracing::warn!(%task_id, attempt, "retries exhausted, failing task and cascading cancellation");
        {
            let mut guard = self.store.lock();
            let event = Event::TaskFailed { job_id, task_id, attempt, instance_id, error: error.clone() };
            guard.append(event)?;
            let event = Event::JobFailed { job_id, error: error.message.clone() };
            guard.append(event)?;
        }
        self.cascade_cancel(job_id).await?;
        Ok(())
    }

    /// Step 5: a lease TTL expiry is a transient failure — restore the
    /// task to `ready` and re-enqueue (§4.4, I4: retried attempts use
    /// fresh attempt-scoped URIs so the stale attempt's partial writes
    /// are never mistaken for the new one's).
    async fn on_heartbeat_expired(&self, job_id: dalston_core::job::JobId, task_id: TaskId) -> Result<(), SchedulerError> {
        let (job, task) = {
            let mut guard = self.store.lock();
            let event = Event::TaskHeartbeatExpired { job_id, task_id };
            guard.append(event)?;
            let job = guard.state().get_job(&job_id).cloned().ok_or_else(|| SchedulerError::JobNotFound(job_id.as_uuid()))?;
            let task = guard.state().get_task(&task_id).cloned().ok_or_else(|| SchedulerError::TaskNotFound(task_id.as_uuid()))?;
            (job, task)
        };
        self.dispatch(&job, &task).await?;
        Ok(())
    }

    /// Step 6: pending/ready tasks cancel immediately; running tasks get a
    /// cooperative cancel signal via their queue's cancel channel (§5)
    /// rather than being forcibly stopped.
    async fn on_cancel_requested(&self, job_id: dalston_core::job::JobId) -> Result<(), SchedulerError> {
        self.cascade_cancel(job_id).await
    }

    async fn cascade_cancel(&self, job_id: dalston_core::job::JobId) -> Result<(), SchedulerError> {
        let to_cancel: Vec<TaskId> = {
            let guard = self.store.lock();
            guard
                .state()
                .tasks_for_job(job_id)
                .filter(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::Ready))
                .map(|t| t.id)
                .collect()
        };
        for task_id in to_cancel {
            let mut guard = self.store.lock();
            let event = Event::TaskCancelled { job_id, task_id };
            guard.append(event)?;
        }

        // Running tasks never started by this replica: the lease holder
        // owns their row (§5 "engines mutate only the task row they
        // currently lease"), so cascade only signals the cancel channel
        // and waits for the engine's own `task.cancelled` report (or a
        // heartbeat expiry) instead of overwriting the row directly.
        let running: Vec<(TaskId, String)> = {
            let guard = self.store.lock();
            guard
                .state()
                .tasks_for_job(job_id)
                .filter(|t| t.status == TaskStatus::Running)
                .map(|t| (t.id, format!("cancel://{job_id}/{}", t.id)))
                .collect()
        };
        for (task_id, _cancel_channel) in running {
            let envelope = EventEnvelope {
                event_id: 0,
                timestamp_ms: self.clock.epoch_ms(),
                correlation_id: None,
                payload: Event::TaskCancelled { job_id, task_id },
            };
            self.broker.publish(envelope).await?;
        }

        let all_terminal = {
            let guard = self.store.lock();
            guard.state().tasks_for_job(job_id).all(|t| t.status.is_terminal())
        };
        if all_terminal {
            let mut guard = self.store.lock();
            let event = Event::JobCancelled { job_id };
            guard.append(event)?;
        }
        Ok(())
    }

    /// Step 7: recompute `progress_percent` and `current_stage` after
    /// every transition.
    fn recompute_progress(&self, job_id: dalston_core::job::JobId) {
        let mut guard = self.store.lock();
        let tasks: Vec<Task> = guard.state().tasks_for_job(job_id).cloned().collect();
        if tasks.is_empty() {
            return;
        }
        let total = tasks.len();
        let terminal = tasks.iter().filter(|t| t.status.is_terminal()).count();
        let progress = ((terminal * 100) / total) as u8;
        let current_stage = tasks
            .iter()
            .find(|t| !t.status.is_terminal())
            .or_else(|| tasks.iter().max_by_key(|t| t.status.is_terminal() as u8))
            .map(|t| t.stage.to_string());

        if let Some(job) = guard.state_mut().jobs.get_mut(&job_id) {
            job.progress_percent = progress;
            job.current_stage = current_stage;
        }
    }

    async fn finalize_completed_job(&self, job_id: dalston_core::job::JobId) -> Result<(), SchedulerError> {
        let merge_outputs = {
            let guard = self.store.lock();
            guard
                .state()
                .tasks_for_job(job_id)
                .find(|t| t.stage == Stage::Merge)
                .map(|t| t.outputs.clone())
                .unwrap_or_default()
        };
        let transcript_uri = merge_outputs
            .iter()
            .find(|o| o.artifact_type == "transcript.raw" || o.artifact_type == "transcript.redacted")
            .map(|o| o.uri.clone());

        let mut guard = self.store.lock();
        let Some(transcript_uri) = transcript_uri else {
            // §3.1(b)/L4: `completed` requires a non-empty transcript URI.
            // A merge task that finished without producing a
            // transcript.raw/transcript.redacted output is a contract
            // violation by the merge engine, not a pipeline success.
            tracing::error!(%job_id, "merge task completed without a transcript output");
            let event = Event::JobFailed { job_id, error: "merge produced no transcript artifact".to_string() };
            guard.append(event)?;
            return Ok(());
        };

        if let Some(job) = guard.state_mut().jobs.get_mut(&job_id) {
            job.result.transcript_uri = Some(transcript_uri);
            job.result.language = Some(job.params.language.clone());
            if let Some(purge_after) = job.params.retention.purge_after_ms(self.clock.epoch_ms()) {
                job.purge_after_ms = Some(purge_after);
            } else {
                job.purge_after_ms = None;
            }
        }
        let event = Event::JobCompleted { job_id };
        guard.append(event)?;
        Ok(())
    }

    /// Transition a just-built or newly-satisfied task to `ready` and hand
    /// it to the engine queue.
    async fn mark_ready_and_dispatch(&self, job: &Job, task: &Task) -> Result<(), SchedulerError> {
        {
            let mut guard = self.store.lock();
            let event = Event::TaskReady { job_id: job.id, task_id: task.id };
            guard.append(event)?;
        }
        self.dispatch(job, task).await
    }

    async fn dispatch(&self, job: &Job, task: &Task) -> Result<(), SchedulerError> {
        let inputs = {
            let guard = self.store.lock();
            gather_inputs(guard.state(), job, task)
        };
        let message = EngineQueueMessage {
            task_id: task.id,
            job_id: job.id,
            stage: task.stage,
            engine_id: task.engine_descriptor_id.clone(),
            attempt: task.attempt,
            lease_seconds: task.timeout_s,
            inputs,
            parameters: stage_parameters(job, task),
            cancel_channel: format!("cancel://{}/{}", job.id, task.id),
            deadline_at_ms: self.clock.epoch_ms() + task.timeout_s * 1000,
        };
        self.broker.enqueue(&task.engine_descriptor_id, message).await?;
        Ok(())
    }

    /// Restart recovery (§9 "Global state" / §4.4): re-derive whatever the
    /// crash lost between the WAL and the in-memory projections, and
    /// re-enqueue whatever might never have reached the broker.
    ///
    /// `job.status`/`progress_percent`/`current_stage` are direct
    /// mutations, not WAL events (there is no `job.started` event), so a
    /// crash between `on_job_created`'s task insert and its `transition`
    /// call — or between either of those and `save_snapshot` — can leave a
    /// job's tasks built but its own status still `pending`. Likewise a
    /// `task.ready` event can be durable while the broker never received
    /// the `enqueue` that followed it, if the process died in between.
    /// Both cases are re-derived/re-sent here; `enqueue`/`dispatch` are
    /// idempotent from the engine's point of view (attempt-scoped URIs,
    /// I4), so re-dispatching a task that was in fact already delivered is
    /// harmless.
    pub async fn reconcile(&self) -> Result<ReconcileReport, SchedulerError> {
        let now = self.clock.epoch_ms();
        let mut report = ReconcileReport::default();

        let job_ids: Vec<dalston_core::job::JobId> = {
            let guard = self.store.lock();
            guard.state().jobs.values().map(|j| j.id).collect()
        };

        for job_id in job_ids {
            let (job, tasks) = {
                let guard = self.store.lock();
                let job = match guard.state().get_job(&job_id).cloned() {
                    Some(j) => j,
                    None => continue,
                };
                let tasks: Vec<Task> = guard.state().tasks_for_job(job_id).cloned().collect();
                (job, tasks)
            };
            if tasks.is_empty() {
                continue;
            }

            if job.status == JobStatus::Pending {
                let mut guard = self.store.lock();
                if let Some(job_mut) = guard.state_mut().jobs.get_mut(&job_id) {
                    let _ = job_mut.transition(JobStatus::Running);
                }
                report.jobs_rederived += 1;
            }

            for task in &tasks {
                match task.status {
                    TaskStatus::Pending if is_ready(&tasks, task) => {
                        self.mark_ready_and_dispatch(&job, task).await?;
                        report.tasks_redispatched += 1;
                    }
                    TaskStatus::Ready => {
                        self.dispatch(&job, task).await?;
                        report.tasks_redispatched += 1;
                    }
                    TaskStatus::Running if task.lease_expired(now) => {
                        self.on_heartbeat_expired(job_id, task.id).await?;
                        report.tasks_redispatched += 1;
                    }
                    _ => {}
                }
            }

            self.recompute_progress(job_id);
        }

        Ok(report)
    }
}

/// Whether `task`'s own dependency stages are all terminal-success,
/// matching [`newly_ready_tasks`]'s criterion but applied to one task
/// against the full sibling list already in hand (avoids a second store
/// lock during [`Scheduler::reconcile`]).
fn is_ready(all: &[Task], task: &Task) -> bool {
    task.depends_on
        .iter()
        .all(|dep_stage| all.iter().any(|other| other.stage == *dep_stage && other.status.is_terminal_success()))
}

/// Counts from one `reconcile` pass, logged by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub jobs_rederived: u32,
    pub tasks_redispatched: u32,
}

/// Tasks whose dependencies are now all terminal-success and are still
/// `pending` (§4.3 step 3).
fn newly_ready_tasks(state: &MaterializedState, job_id: dalston_core::job::JobId) -> Vec<Task> {
    let all: Vec<Task> = state.tasks_for_job(job_id).cloned().collect();
    all.iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .filter(|t| {
            t.depends_on.iter().all(|dep_stage| {
                all.iter().any(|other| other.stage == *dep_stage && other.status.is_terminal_success())
            })
        })
        .cloned()
        .collect()
}

/// Build the queue message's `inputs` from the outputs of `task`'s
/// dependency stages, or the job's source audio for a task with no
/// dependencies (i.e. `prepare`).
fn gather_inputs(state: &MaterializedState, job: &Job, task: &Task) -> Vec<EngineQueueInput> {
    if task.depends_on.is_empty() {
        return vec![EngineQueueInput {
            artifact_type: "audio.source".to_string(),
            uri: job.params.source_uri.clone(),
            checksum: None,
        }];
    }
    task.depends_on
        .iter()
        .flat_map(|dep_stage| {
            state
                .tasks_for_job(job.id)
                .find(|t| t.stage == *dep_stage)
                .map(|t| t.outputs.clone())
                .unwrap_or_default()
        })
        .map(|o| EngineQueueInput { artifact_type: o.artifact_type, uri: o.uri, checksum: o.checksum })
        .collect()
}

/// Stage-specific parameters carried on the queue message (§6.3).
fn stage_parameters(job: &Job, task: &Task) -> serde_json::Value {
    match task.stage {
        Stage::Transcribe | Stage::TranscribeChannel(_) => serde_json::json!({
            "language": job.params.language,
            "timestamps_granularity": job.params.timestamps_granularity,
        }),
        Stage::PiiDetect => serde_json::json!({ "mode": job.params.pii_redaction_mode }),
        Stage::AudioRedact => serde_json::json!({ "mode": job.params.pii_redaction_mode }),
        _ => serde_json::json!({}),
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
