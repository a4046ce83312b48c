// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker loop an engine process runs (C7, §4.5): register, then
//! repeatedly dequeue-and-lease a task, fetch its inputs, run the work
//! function while heartbeating the lease and watching for cooperative
//! cancellation, publish the outcome, and ack the queue message.

use crate::error::WorkerError;
use crate::work::{EngineWork, FetchedInput};
use dalston_adapters::broker::Broker;
use dalston_adapters::object_store::ObjectStore;
use dalston_core::clock::Clock;
use dalston_core::engine::{EngineDescriptorId, EngineInstanceId, InstanceStatus};
use dalston_core::event::{Event, EventEnvelope};
use dalston_core::task::{ArtifactRef, TaskId};
use dalston_daemon::registry::EngineRegistry;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

/// Tunables for one worker's loop (§4.5, §5 heartbeat TTL defaults).
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub lease_seconds: u64,
    pub heartbeat_interval: Duration,
    /// How long to sleep before trying `dequeue_lease` again after finding
    /// the queue empty.
    pub empty_queue_backoff: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            lease_seconds: 300,
            heartbeat_interval: Duration::from_secs(10),
            empty_queue_backoff: Duration::from_millis(500),
        }
    }
}

/// One engine process's worker loop, generic over its work function and
/// clock (the latter so tests can drive heartbeat/cancel timing without
/// sleeping).
pub struct Worker<W: EngineWork, C: Clock> {
    descriptor_id: EngineDescriptorId,
    instance_id: EngineInstanceId,
    registry: EngineRegistry<C>,
    broker: Arc<dyn Broker>,
    object_store: Arc<dyn ObjectStore>,
    work: W,
    clock: C,
    config: WorkerConfig,
}

impl<W: EngineWork, C: Clock> Worker<W, C> {
    /// Register a fresh instance with the Engine Registry (§4.5 step 1)
    /// and build the worker that will serve its descriptor's queue.
    pub fn register(
        descriptor_id: EngineDescriptorId,
        loaded_model: String,
        registry: EngineRegistry<C>,
        broker: Arc<dyn Broker>,
        object_store: Arc<dyn ObjectStore>,
        work: W,
        clock: C,
        config: WorkerConfig,
    ) -> Self {
        let instance_id = registry.register(descriptor_id.clone(), loaded_model);
        Self { descriptor_id, instance_id, registry, broker, object_store, work, clock, config }
    }

    pub fn instance_id(&self) -> EngineInstanceId {
        self.instance_id
    }

    /// One dequeue-execute-report cycle. Returns `false` if the queue had
    /// nothing to lease, so callers can back off instead of busy-polling.
    pub async fn run_once(&self) -> Result<bool, WorkerError> {
        let Some(lease) = self.broker.dequeue_lease(&self.descriptor_id, self.config.lease_seconds).await? else {
            return Ok(false);
        };
        self.process(lease).await?;
        Ok(true)
    }

    /// Run until `shutdown` resolves, backing off when the queue is empty
    /// rather than hammering `dequeue_lease` (§5 "blocks on dequeue with
    /// lease timeout").
    pub async fn run(&self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!(instance_id = %self.instance_id, "worker shutting down");
                    return;
                }
                result = self.run_once() => {
                    match result {
                        Ok(true) => {}
                        Ok(false) => tokio::time::sleep(self.config.empty_queue_backoff).await,
                        Err(err) => {
                            tracing::warn!(%err, instance_id = %self.instance_id, "worker loop error");
                            tokio::time::sleep(self.config.empty_queue_backoff).await;
                        }
                    }
                }
            }
        }
    }

    async fn process(&self, lease: dalston_adapters::broker::Lease) -> Result<(), WorkerError> {
        let message = lease.message;
        self.registry.heartbeat(self.instance_id, InstanceStatus::Running)?;

        let lease_deadline_ms = self.clock.epoch_ms() + self.config.lease_seconds * 1_000;
        self.broker
            .publish(self.envelope(Event::TaskStarted {
                job_id: message.job_id,
                task_id: message.task_id,
                instance_id: self.instance_id,
                lease_deadline_ms,
            }))
            .await?;

        let mut inputs = Vec::with_capacity(message.inputs.len());
        for input in &message.inputs {
            let bytes = self.object_store.get(&input.uri).await?;
            inputs.push(FetchedInput { artifact_type: input.artifact_type.clone(), uri: input.uri.clone(), bytes });
        }

        let outcome = self.run_work_with_heartbeat(lease.token, &message.cancel_channel, message.task_id, inputs, message.parameters.clone()).await?;

        match outcome {
            Outcome::Completed(output) => {
                let mut outputs = Vec::with_capacity(output.artifacts.len());
                for artifact in output.artifacts {
                    let uri = format!(
                        "artifact://{}/{}/{}/{}",
                        message.job_id, message.task_id, message.attempt, artifact.artifact_type
                    );
                    let checksum = sha256_hex(&artifact.bytes);
                    self.object_store.put(&uri, artifact.bytes).await?;
                    outputs.push(ArtifactRef { artifact_type: artifact.artifact_type, uri, checksum: Some(checksum) });
                }
                self.broker
                    .publish(self.envelope(Event::TaskCompleted {
                        job_id: message.job_id,
                        task_id: message.task_id,
                        attempt: message.attempt,
                        instance_id: self.instance_id,
                        outputs,
                    }))
                    .await?;
            }
            Outcome::Failed(error) => {
                self.broker
                    .publish(self.envelope(Event::TaskFailed {
                        job_id: message.job_id,
                        task_id: message.task_id,
                        attempt: message.attempt,
                        instance_id: self.instance_id,
                        error,
                    }))
                    .await?;
            }
            Outcome::Cancelled => {
                self.broker
                    .publish(self.envelope(Event::TaskCancelled { job_id: message.job_id, task_id: message.task_id }))
                    .await?;
            }
        }

        self.broker.ack_lease(lease.token).await?;
        self.registry.heartbeat(self.instance_id, InstanceStatus::Available)?;
        Ok(())
    }

    /// Race the work function against a heartbeat/cancel-check tick
    /// (§4.5 step 7, step 8). The lease is extended, and the cancel
    /// channel drained, on every tick until the work function resolves or
    /// a cancellation signal is observed.
    async fn run_work_with_heartbeat(
        &self,
        lease_token: dalston_adapters::broker::LeaseToken,
        cancel_channel: &str,
        task_id: TaskId,
        inputs: Vec<FetchedInput>,
        parameters: serde_json::Value,
    ) -> Result<Outcome, WorkerError> {
        let mut interval = tokio::time::interval(self.config.heartbeat_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let work = self.work.execute(inputs, parameters);
        tokio::pin!(work);

        loop {
            tokio::select! {
                result = &mut work => {
                    return Ok(match result {
                        Ok(output) => Outcome::Completed(output),
                        Err(error) => Outcome::Failed(error),
                    });
                }
                _ = interval.tick() => {
                    self.broker.renew_lease(lease_token, self.config.lease_seconds).await?;
                    self.registry.heartbeat(self.instance_id, InstanceStatus::Running)?;
                    if self.cancel_requested(cancel_channel, task_id).await? {
                        return Ok(Outcome::Cancelled);
                    }
                }
            }
        }
    }

    /// Drain `cancel_channel` (§4.5 step 8): every distinct channel name
    /// is its own consumer group over the shared event log, so the first
    /// drain walks the whole log once and subsequent calls only see what
    /// was published since.
    async fn cancel_requested(&self, cancel_channel: &str, task_id: TaskId) -> Result<bool, WorkerError> {
        let mut cancelled = false;
        while let Some(delivered) = self.broker.poll(cancel_channel, 1).await? {
            self.broker.ack(cancel_channel, delivered.token).await?;
            if let Event::TaskCancelled { task_id: signalled, .. } = delivered.envelope.payload {
                if signalled == task_id {
                    cancelled = true;
                }
            }
        }
        Ok(cancelled)
    }

    fn envelope(&self, event: Event) -> EventEnvelope {
        EventEnvelope { event_id: 0, timestamp_ms: self.clock.epoch_ms(), correlation_id: None, payload: event }
    }
}

enum Outcome {
    Completed(crate::work::WorkOutput),
    Failed(dalston_core::task::TaskError),
    Cancelled,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    use std::fmt::Write;
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
