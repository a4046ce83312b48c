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
engine "prep" { stage = "prepare" image = "i" }
engine "whisper-fast" {
  stage     = "transcribe"
  languages = "all"
  image     = "i"
  aliases   = ["fast"]
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
fn list_reports_no_engines_when_the_catalog_is_empty_of_instances() {
    let (gw, _registry) = gateway();
    let args = EngineArgs { command: EngineCommand::List };
    assert!(run(args, &gw, OutputFormat::Text).is_ok());
}

#[test]
fn list_rolls_up_a_registered_instance_in_text_mode() {
    let (gw, registry) = gateway();
    registry.register(EngineDescriptorId::new("whisper-fast"), "m".to_string());
    let args = EngineArgs { command: EngineCommand::List };
    assert!(run(args, &gw, OutputFormat::Text).is_ok());
}

#[test]
fn list_emits_valid_json() {
    let (gw, registry) = gateway();
    registry.register(EngineDescriptorId::new("whisper-fast"), "m".to_string());
    let args = EngineArgs { command: EngineCommand::List };
    assert!(run(args, &gw, OutputFormat::Json).is_ok());
}
