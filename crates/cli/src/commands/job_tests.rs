use super::*;
use dalston_adapters::broker::{Broker, InMemoryBroker};
use dalston_catalog::Catalog;
use dalston_core::clock::FakeClock;
use dalston_daemon::registry::EngineRegistry;
use dalston_daemon::router::SessionRouter;
use dalston_daemon::scheduler::Scheduler;
use dalston_daemon::SharedStore;
use dalston_storage::StateStore;
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::tempdir;

const MANIFEST: &str = r#"
engine "prep" { stage = "prepare" image = "i" }
engine "whisper-fast" {
  stage     = "transcribe"
  languages = "all"
  image     = "i"
  aliases   = ["fast"]
}
engine "merger" { stage = "merge" image = "i" }
"#;

fn gateway() -> Gateway<FakeClock> {
    let catalog = Arc::new(Catalog::from_manifest_str(MANIFEST).unwrap());
    let dir = tempdir().unwrap();
    let store: SharedStore = Arc::new(Mutex::new(StateStore::open(dir.path().join("wal"), 0).unwrap()));
    let clock = FakeClock::new();
    let registry = EngineRegistry::new(store.clone(), clock.clone(), 30_000);
    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::with_clock(clock.clone()));
    let scheduler = Scheduler::new(store.clone(), registry.clone(), catalog.clone(), broker, clock.clone(), 3);
    let router = SessionRouter::new(store, registry.clone(), catalog, clock);
    Gateway::new(scheduler, router, registry)
}

fn args(input: &[&str]) -> JobArgs {
    #[derive(clap::Parser)]
    struct Wrap {
        #[command(subcommand)]
        command: JobCommand,
    }
    let mut full = vec!["job"];
    full.extend_from_slice(input);
    JobArgs { command: Wrap::parse_from(full).command }
}

#[tokio::test]
async fn submit_prints_the_new_job_id_and_returns_ok() {
    let gw = gateway();
    let submitted = args(&["submit", "--tenant", "t1", "mem://a.wav"]);
    let result = run(submitted, &gw, OutputFormat::Text).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn submit_rejects_an_invalid_speaker_detection_value() {
    let gw = gateway();
    let submitted = args(&["submit", "--tenant", "t1", "--speaker-detection", "bogus", "mem://a.wav"]);
    let err = run(submitted, &gw, OutputFormat::Text).await.unwrap_err();
    assert_eq!(err.code, 2);
}

#[tokio::test]
async fn list_reports_no_jobs_found_for_an_empty_tenant() {
    let gw = gateway();
    let result = run(args(&["list", "--tenant", "empty-tenant"]), &gw, OutputFormat::Text).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn show_reports_job_not_found_for_an_unknown_id() {
    let gw = gateway();
    let unknown = uuid::Uuid::new_v4().to_string();
    let err = run(args(&["show", &unknown]), &gw, OutputFormat::Text).await.unwrap_err();
    assert_eq!(err.code, 2);
}

#[tokio::test]
async fn show_rejects_a_malformed_id() {
    let gw = gateway();
    let err = run(args(&["show", "not-a-uuid"]), &gw, OutputFormat::Text).await.unwrap_err();
    assert_eq!(err.code, 2);
}

#[tokio::test]
async fn submit_then_show_round_trips_the_job_id() {
    let gw = gateway();
    let req = SubmitRequest {
        tenant_id: "t1".to_string(),
        source_uri: "mem://a.wav".to_string(),
        model: "auto".to_string(),
        language: "en".to_string(),
        speaker_detection: dalston_core::job::SpeakerDetection::None,
        timestamps_granularity: dalston_core::job::TimestampGranularity::None,
        pii_detection: false,
        redact_pii_audio: false,
        pii_redaction_mode: None,
        retention_policy: None,
        correlation_id: None,
    };
    let job = gw.submit(req).await.unwrap();
    let id = job.id.as_uuid().to_string();
    let result = run(args(&["show", &id]), &gw, OutputFormat::Json).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn cancel_an_unknown_job_surfaces_the_scheduler_error() {
    let gw = gateway();
    let unknown = uuid::Uuid::new_v4().to_string();
    let err = run(args(&["cancel", &unknown]), &gw, OutputFormat::Text).await.unwrap_err();
    assert_eq!(err.code, 1);
}

#[tokio::test]
async fn tasks_on_a_freshly_submitted_job_is_empty() {
    let gw = gateway();
    let req = SubmitRequest {
        tenant_id: "t1".to_string(),
        source_uri: "mem://a.wav".to_string(),
        model: "auto".to_string(),
        language: "en".to_string(),
        speaker_detection: dalston_core::job::SpeakerDetection::None,
        timestamps_granularity: dalston_core::job::TimestampGranularity::None,
        pii_detection: false,
        redact_pii_audio: false,
        pii_redaction_mode: None,
        retention_policy: None,
        correlation_id: None,
    };
    let job = gw.submit(req).await.unwrap();
    let id = job.id.as_uuid().to_string();
    let result = run(args(&["tasks", &id]), &gw, OutputFormat::Text).await;
    assert!(result.is_ok());
}
