use super::*;
use crate::router::SessionRouter;
use dalston_adapters::broker::{Broker, InMemoryBroker};
use dalston_catalog::Catalog;
use dalston_core::clock::FakeClock;
use dalston_core::engine::EngineDescriptorId;
use dalston_core::job::{RetentionDays, SpeakerDetection, TimestampGranularity};
use dalston_storage::StateStore;
use parking_lot::Mutex;
use tempfile::tempdir;

const MANIFEST: &str = r#"
engine "prep" { stage = "prepare" image = "i" }
engine "whisper-fast" {
  stage     = "transcribe"
  languages = "all"
  image     = "i"
  aliases   = ["fast"]

  capabilities {
    word_timestamps = true
    streaming       = true
  }
}
engine "merger" { stage = "merge" image = "i" }
"#;

fn harness() -> (Gateway<FakeClock>, SharedStore, FakeClock, EngineRegistry<FakeClock>) {
    let catalog = Arc::new(Catalog::from_manifest_str(MANIFEST).unwrap());
    let dir = tempdir().unwrap();
    let store: SharedStore = Arc::new(Mutex::new(StateStore::open(dir.path().join("wal"), 0).unwrap()));
    let clock = FakeClock::new();
    let registry = EngineRegistry::new(store.clone(), clock.clone(), 30_000);
    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::with_clock(clock.clone()));
    let scheduler = Scheduler::new(store.clone(), registry.clone(), catalog.clone(), broker, clock.clone(), 3);
    let router = SessionRouter::new(store.clone(), registry.clone(), catalog, clock.clone());
    let gateway = Gateway::new(scheduler, router, registry.clone());
    (gateway, store, clock, registry)
}

fn submit_request() -> SubmitRequest {
    SubmitRequest {
        tenant_id: "tenant-a".to_string(),
        source_uri: "mem://a.wav".to_string(),
        model: "auto".to_string(),
        language: "en".to_string(),
        speaker_detection: SpeakerDetection::None,
        timestamps_granularity: TimestampGranularity::None,
        pii_detection: false,
        redact_pii_audio: false,
        pii_redaction_mode: None,
        retention_policy: Some(RetentionDays::days(30)),
        correlation_id: None,
    }
}

#[tokio::test]
async fn submit_persists_and_returns_a_pending_job_record() {
    let (gateway, _store, _clock, _registry) = harness();
    let record = gateway.submit(submit_request()).await.unwrap();
    assert_eq!(record.status, dalston_core::job::JobStatus::Pending);
    assert_eq!(gateway.get_job(record.id.as_uuid()).unwrap().id, record.id);
}

#[tokio::test]
async fn list_jobs_scopes_to_the_tenant() {
    let (gateway, _store, _clock, _registry) = harness();
    gateway.submit(submit_request()).await.unwrap();
    let mut other = submit_request();
    other.tenant_id = "tenant-b".to_string();
    gateway.submit(other).await.unwrap();

    assert_eq!(gateway.list_jobs("tenant-a").len(), 1);
    assert_eq!(gateway.list_jobs("tenant-b").len(), 1);
}

#[tokio::test]
async fn list_tasks_is_empty_until_the_job_created_event_is_processed() {
    let (gateway, _store, _clock, _registry) = harness();
    let record = gateway.submit(submit_request()).await.unwrap();
    assert!(gateway.list_tasks(record.id.as_uuid()).is_empty());
}

#[tokio::test]
async fn cancel_job_reports_accepted_then_already_terminal() {
    let (gateway, _store, _clock, _registry) = harness();
    let record = gateway.submit(submit_request()).await.unwrap();
    let first = gateway.cancel_job(record.id.as_uuid()).unwrap();
    assert_eq!(first, CancelOutcome::Accepted);
}

#[test]
fn list_engines_rolls_up_catalog_entries_with_live_instance_counts() {
    let (gateway, _store, _clock, registry) = harness();
    registry.register(EngineDescriptorId::new("whisper-fast"), "m".to_string());

    let records = gateway.list_engines();
    let whisper = records.iter().find(|r| r.id.as_str() == "whisper-fast").unwrap();
    assert_eq!(whisper.live_instances, 1);
    assert_eq!(whisper.available_instances, 1);
    let prep = records.iter().find(|r| r.id.as_str() == "prep").unwrap();
    assert_eq!(prep.live_instances, 0);
}

#[test]
fn allocate_and_release_session_round_trip() {
    let (gateway, _store, _clock, registry) = harness();
    registry.register(EngineDescriptorId::new("whisper-fast"), "m".to_string());

    let ticket = gateway
        .allocate_session(AllocateRequest {
            tenant_id: "tenant-a".to_string(),
            language: "en".to_string(),
            model: "fast".to_string(),
            encoding: "pcm_s16le".to_string(),
            sample_rate: 16_000,
            retention: RetentionDays::days(7),
        })
        .unwrap();
    assert_eq!(ticket.ticket, ticket.session_id.to_string());

    gateway
        .release_session(
            ticket.session_id.as_uuid(),
            dalston_core::session::SessionStatus::Completed,
            dalston_core::session::SessionStats::default(),
        )
        .unwrap();
}
