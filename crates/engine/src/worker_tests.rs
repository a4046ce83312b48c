use super::*;
use crate::work::{ProducedArtifact, WorkOutput};
use async_trait::async_trait;
use dalston_adapters::broker::InMemoryBroker;
use dalston_adapters::object_store::InMemoryObjectStore;
use dalston_core::clock::FakeClock;
use dalston_core::job::JobId;
use dalston_core::stage::Stage;
use dalston_core::task::TaskError;
use dalston_daemon::SharedStore;
use dalston_storage::StateStore;
use dalston_wire::{EngineQueueInput, EngineQueueMessage};
use parking_lot::Mutex;
use tempfile::tempdir;

struct Echo;

#[async_trait]
impl EngineWork for Echo {
    async fn execute(&self, inputs: Vec<FetchedInput>, _parameters: serde_json::Value) -> Result<WorkOutput, TaskError> {
        let bytes = inputs.into_iter().next().map(|i| i.bytes).unwrap_or_default();
        Ok(WorkOutput { artifacts: vec![ProducedArtifact { artifact_type: "audio.mono_16k".to_string(), bytes }], manifest: serde_json::Value::Null })
    }
}

struct AlwaysFails;

#[async_trait]
impl EngineWork for AlwaysFails {
    async fn execute(&self, _inputs: Vec<FetchedInput>, _parameters: serde_json::Value) -> Result<WorkOutput, TaskError> {
        Err(TaskError { kind: "engine_transient".to_string(), message: "boom".to_string(), retryable: true })
    }
}

/// Blocks until released, for cancellation tests.
struct Blocks {
    release: tokio::sync::Notify,
}

#[async_trait]
impl EngineWork for Blocks {
    async fn execute(&self, _inputs: Vec<FetchedInput>, _parameters: serde_json::Value) -> Result<WorkOutput, TaskError> {
        self.release.notified().await;
        Ok(WorkOutput::default())
    }
}

fn message(job_id: JobId, task_id: dalston_core::task::TaskId) -> EngineQueueMessage {
    EngineQueueMessage {
        task_id,
        job_id,
        stage: Stage::Prepare,
        engine_id: EngineDescriptorId::new("prep"),
        attempt: 1,
        lease_seconds: 30,
        inputs: vec![EngineQueueInput { artifact_type: "audio.raw".to_string(), uri: "mem://input".to_string(), checksum: None }],
        parameters: serde_json::Value::Null,
        cancel_channel: format!("cancel://{job_id}/{task_id}"),
        deadline_at_ms: 60_000,
    }
}

fn store() -> SharedStore {
    let dir = tempdir().unwrap();
    Arc::new(Mutex::new(StateStore::open(dir.path().join("wal"), 0).unwrap()))
}

#[tokio::test]
async fn register_writes_an_available_instance_to_the_registry() {
    let clock = FakeClock::new();
    let registry = EngineRegistry::new(store(), clock.clone(), 30_000);
    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::with_clock(clock.clone()));
    let object_store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
    let worker = Worker::register(
        EngineDescriptorId::new("prep"),
        "prep-v1".to_string(),
        registry.clone(),
        broker,
        object_store,
        Echo,
        clock,
        WorkerConfig::default(),
    );

    let instance = registry.get(worker.instance_id()).unwrap();
    assert_eq!(instance.status, InstanceStatus::Available);
    assert_eq!(instance.loaded_model, "prep-v1");
}

#[tokio::test]
async fn run_once_is_false_on_an_empty_queue() {
    let clock = FakeClock::new();
    let registry = EngineRegistry::new(store(), clock.clone(), 30_000);
    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::with_clock(clock.clone()));
    let object_store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
    let worker = Worker::register(
        EngineDescriptorId::new("prep"),
        "prep-v1".to_string(),
        registry,
        broker,
        object_store,
        Echo,
        clock,
        WorkerConfig::default(),
    );

    assert!(!worker.run_once().await.unwrap());
}

#[tokio::test]
async fn a_completed_task_writes_attempt_scoped_outputs_and_publishes_task_completed() {
    let clock = FakeClock::new();
    let registry = EngineRegistry::new(store(), clock.clone(), 30_000);
    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::with_clock(clock.clone()));
    let object_store = Arc::new(InMemoryObjectStore::new());
    object_store.put("mem://input", b"hello".to_vec()).await.unwrap();
    let object_store_dyn: Arc<dyn ObjectStore> = object_store.clone();
    let worker = Worker::register(
        EngineDescriptorId::new("prep"),
        "prep-v1".to_string(),
        registry,
        broker.clone(),
        object_store_dyn,
        Echo,
        clock,
        WorkerConfig::default(),
    );

    let job_id = JobId::new();
    let task_id = dalston_core::task::TaskId::new();
    broker.enqueue(&EngineDescriptorId::new("prep"), message(job_id, task_id)).await.unwrap();

    assert!(worker.run_once().await.unwrap());

    let started = broker.poll("scheduler", 30).await.unwrap().unwrap();
    assert!(matches!(started.envelope.payload, Event::TaskStarted { task_id: t, .. } if t == task_id));
    let completed = broker.poll("scheduler", 30).await.unwrap().unwrap();
    match completed.envelope.payload {
        Event::TaskCompleted { outputs, attempt, .. } => {
            assert_eq!(attempt, 1);
            assert_eq!(outputs.len(), 1);
            assert!(outputs[0].uri.starts_with("artifact://"));
            assert!(outputs[0].checksum.is_some());
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn a_failing_work_function_publishes_task_failed_and_still_acks_the_lease() {
    let clock = FakeClock::new();
    let registry = EngineRegistry::new(store(), clock.clone(), 30_000);
    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::with_clock(clock.clone()));
    let object_store = Arc::new(InMemoryObjectStore::new());
    object_store.put("mem://input", b"hello".to_vec()).await.unwrap();
    let object_store_dyn: Arc<dyn ObjectStore> = object_store;
    let worker = Worker::register(
        EngineDescriptorId::new("prep"),
        "prep-v1".to_string(),
        registry,
        broker.clone(),
        object_store_dyn,
        AlwaysFails,
        clock,
        WorkerConfig::default(),
    );

    let job_id = JobId::new();
    let task_id = dalston_core::task::TaskId::new();
    broker.enqueue(&EngineDescriptorId::new("prep"), message(job_id, task_id)).await.unwrap();
    worker.run_once().await.unwrap();

    broker.poll("scheduler", 30).await.unwrap();
    let failed = broker.poll("scheduler", 30).await.unwrap().unwrap();
    assert!(matches!(failed.envelope.payload, Event::TaskFailed { error, .. } if error.kind == "engine_transient"));
    assert_eq!(broker.reap_expired_leases().await.unwrap(), 0, "the lease was acked, not left inflight");
}

#[tokio::test]
async fn a_cancel_signal_aborts_the_work_function_and_publishes_task_cancelled() {
    let clock = FakeClock::new();
    let registry = EngineRegistry::new(store(), clock.clone(), 30_000);
    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::with_clock(clock.clone()));
    let object_store = Arc::new(InMemoryObjectStore::new());
    object_store.put("mem://input", b"hello".to_vec()).await.unwrap();
    let object_store_dyn: Arc<dyn ObjectStore> = object_store;
    let config = WorkerConfig { heartbeat_interval: std::time::Duration::from_millis(20), ..WorkerConfig::default() };
    let worker = Worker::register(
        EngineDescriptorId::new("prep"),
        "prep-v1".to_string(),
        registry,
        broker.clone(),
        object_store_dyn,
        Blocks { release: tokio::sync::Notify::new() },
        clock,
        config,
    );

    let job_id = JobId::new();
    let task_id = dalston_core::task::TaskId::new();
    broker.enqueue(&EngineDescriptorId::new("prep"), message(job_id, task_id)).await.unwrap();
    let cancel_channel = format!("cancel://{job_id}/{task_id}");
    broker
        .publish(EventEnvelope { event_id: 0, timestamp_ms: 0, correlation_id: None, payload: Event::TaskCancelled { job_id, task_id } })
        .await
        .unwrap();

    worker.run_once().await.unwrap();

    broker.poll("scheduler", 30).await.unwrap();
    let reported = broker.poll("scheduler", 30).await.unwrap().unwrap();
    assert!(matches!(reported.envelope.payload, Event::TaskCancelled { task_id: t, .. } if t == task_id));
    assert!(broker.poll(&cancel_channel, 1).await.unwrap().is_none(), "the signal was drained, not left for a future poller");
}
