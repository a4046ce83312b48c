use super::*;
use dalston_adapters::broker::{Broker, InMemoryBroker};
use dalston_catalog::Catalog;
use dalston_core::clock::FakeClock;
use dalston_core::engine::EngineDescriptorId;
use dalston_daemon::registry::EngineRegistry;
use dalston_daemon::router::SessionRouter;
use dalston_daemon::scheduler::Scheduler;
use dalston_daemon::SharedStore;
use dalston_storage::StateStore;
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::tempdir;

const MANIFEST: &str = r#"
engine "whisper-fast" {
  stage     = "transcribe"
  languages = "all"
  image     = "i"
  aliases   = ["fast"]

  capabilities {
    streaming = true
  }
}
"#;

fn gateway() -> (Gateway<FakeClock>, EngineRegistry<FakeClock>) {
    let catalog = Arc::new(Catalog::from_manifest_str(MANIFEST).unwrap());
    let dir = tempdir().unwrap();
    let store: SharedStore = Arc::new(Mutex::new(StateStore::open(dir.path().join("wal"), 0).unwrap()));
    let clock = FakeClock::new();
    let registry = EngineRegistry::new(store.clone(), clock.clone(), 30_000);
    let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::with_clock(clock.clone()));
    let scheduler = Scheduler::new(store.clone(), registry.clone(), catalog.clone(), broker, clock.clone(), 3);
    let router = SessionRouter::new(store, registry.clone(), catalog, clock);
    (Gateway::new(scheduler, router, registry.clone()), registry)
}

#[test]
fn allocate_fails_when_no_instance_is_registered() {
    let (gw, _registry) = gateway();
    let args = SessionArgs {
        command: SessionCommand::Allocate {
            tenant: "t1".to_string(),
            language: "en".to_string(),
            model: "fast".to_string(),
            encoding: "pcm16".to_string(),
            sample_rate: 16_000,
            retention_days: None,
        },
    };
    let err = run(args, &gw, OutputFormat::Text).unwrap_err();
    assert_eq!(err.code, 1);
}

#[test]
fn allocate_succeeds_with_a_registered_instance() {
    let (gw, registry) = gateway();
    registry.register(EngineDescriptorId::new("whisper-fast"), "m".to_string());

    let allocate = SessionArgs {
        command: SessionCommand::Allocate {
            tenant: "t1".to_string(),
            language: "en".to_string(),
            model: "fast".to_string(),
            encoding: "pcm16".to_string(),
            sample_rate: 16_000,
            retention_days: Some(7),
        },
    };
    assert!(run(allocate, &gw, OutputFormat::Text).is_ok());
}

#[test]
fn release_rejects_a_malformed_session_id() {
    let (gw, _registry) = gateway();
    let args = SessionArgs {
        command: SessionCommand::Release {
            id: "not-a-uuid".to_string(),
            status: "completed".to_string(),
            audio_duration_s: 1.0,
            segment_count: 1,
            word_count: 1,
        },
    };
    let err = run(args, &gw, OutputFormat::Text).unwrap_err();
    assert_eq!(err.code, 2);
}

#[test]
fn release_rejects_an_unknown_status_value() {
    let (gw, _registry) = gateway();
    let args = SessionArgs {
        command: SessionCommand::Release {
            id: uuid::Uuid::new_v4().to_string(),
            status: "bogus".to_string(),
            audio_duration_s: 0.0,
            segment_count: 0,
            word_count: 0,
        },
    };
    let err = run(args, &gw, OutputFormat::Text).unwrap_err();
    assert_eq!(err.code, 2);
}
