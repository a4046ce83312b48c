use super::*;
use crate::router::SessionRouter;
use crate::scheduler::Scheduler;
use crate::SharedStore;
use dalston_adapters::broker::{Broker, InMemoryBroker};
use dalston_catalog::Catalog;
use dalston_core::clock::FakeClock;
use dalston_core::engine::EngineDescriptorId;
use dalston_core::job::{Job, JobStatus};
use dalston_core::stage::Stage;
use dalston_core::task::{Task, TaskStatus};
use dalston_storage::StateStore;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

const MANIFEST: &str = r#"
engine "prep" { stage = "prepare" image = "i" }
engine "whisper-fast" { stage = "transcribe" languages = "all" image = "i" }
engine "merger" { stage = "merge" image = "i" }
"#;

fn harness() -> (Reconciler<FakeClock>, SharedStore, FakeClock) {
    let catalog = Arc::new(Catalog::from_manifest_str(MANIFEST).unwrap());
    let dir = tempdir().unwrap();
    let store: SharedStore = Arc::new(Mutex::new(StateStore::open(dir.path().join("wal"), 0).unwrap()));
    let clock = FakeClock::new();
    let registry = EngineRegistry::new(store.clone(), clock.clone(), 30_000);
    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::with_clock(clock.clone()));
    let scheduler = Scheduler::new(store.clone(), registry.clone(), catalog.clone(), broker, clock.clone(), 3);
    let router = SessionRouter::new(store.clone(), registry.clone(), catalog, clock.clone());
    let reconciler = Reconciler::new(scheduler, router, registry);
    (reconciler, store, clock)
}

fn insert_job_with_task(store: &SharedStore, job_status: JobStatus, task_status: TaskStatus) -> (Job, Task) {
    let job = Job::builder().status(job_status).build();
    let task = Task::builder().job_id(job.id).stage(Stage::Prepare).status(task_status).build();
    let mut guard = store.lock();
    guard.state_mut().insert_job(job.clone());
    guard.state_mut().insert_task(task.clone()).unwrap();
    (job, task)
}

#[tokio::test]
async fn reconcile_rederives_running_status_for_a_job_left_pending() {
    let (reconciler, store, _clock) = harness();
    let (job, _task) = insert_job_with_task(&store, JobStatus::Pending, TaskStatus::Pending);

    let summary = reconciler.run().await.unwrap();
    assert_eq!(summary.scheduler.jobs_rederived, 1);
    assert_eq!(store.lock().state().get_job(&job.id).unwrap().status, JobStatus::Running);
}

#[tokio::test]
async fn reconcile_redispatches_a_ready_task_that_never_reached_the_broker() {
    let (reconciler, store, _clock) = harness();
    let (_job, _task) = insert_job_with_task(&store, JobStatus::Running, TaskStatus::Ready);

    let summary = reconciler.run().await.unwrap();
    assert_eq!(summary.scheduler.tasks_redispatched, 1);
}

#[tokio::test]
async fn reconcile_redispatches_a_running_task_whose_lease_has_expired() {
    let (reconciler, store, clock) = harness();
    let job = Job::builder().status(JobStatus::Running).build();
    let task = Task::builder()
        .job_id(job.id)
        .stage(Stage::Prepare)
        .status(TaskStatus::Running)
        .lease_holder(Some(dalston_core::engine::EngineInstanceId::new()))
        .lease_deadline_ms(Some(clock.epoch_ms()))
        .build();
    {
        let mut guard = store.lock();
        guard.state_mut().insert_job(job.clone());
        guard.state_mut().insert_task(task.clone()).unwrap();
    }
    clock.advance(Duration::from_secs(1));

    let summary = reconciler.run().await.unwrap();
    assert_eq!(summary.scheduler.tasks_redispatched, 1);
    let after = store.lock().state().get_task(&task.id).cloned().unwrap();
    assert_eq!(after.status, TaskStatus::Ready);
    assert!(after.lease_holder.is_none());
}

#[tokio::test]
async fn reconcile_is_a_no_op_once_everything_is_consistent() {
    let (reconciler, _store, _clock) = harness();
    let summary = reconciler.run().await.unwrap();
    assert_eq!(summary.scheduler.jobs_rederived, 0);
    assert_eq!(summary.scheduler.tasks_redispatched, 0);
    assert!(summary.sessions_interrupted.is_empty());
    assert!(summary.sessions_orphaned.is_empty());
}
