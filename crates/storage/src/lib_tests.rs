use super::*;
use dalston_core::{Job, JobStatus};
use tempfile::tempdir;

#[test]
fn append_applies_immediately() {
    let dir = tempdir().unwrap();
    let mut store = StateStore::open(dir.path().join("state.wal"), 0).unwrap();

    let job = Job::builder().status(JobStatus::Running).build();
    let id = job.id;
    store.state_mut().insert_job(job);
    store.append(Event::JobCompleted { job_id: id }).unwrap();

    assert_eq!(store.state().get_job(&id).unwrap().status, JobStatus::Completed);
}

#[test]
fn replaying_an_event_twice_is_idempotent() {
    let dir = tempdir().unwrap();
    let wal_path = dir.path().join("state.wal");
    let mut wal = Wal::open(&wal_path, 0).unwrap();

    let job = Job::builder().status(JobStatus::Running).build();
    let id = job.id;
    let mut state = MaterializedState::default();
    state.insert_job(job);

    wal.append(&Event::JobCompleted { job_id: id }).unwrap();
    wal.flush().unwrap();

    // Applied once for immediate visibility at submit time...
    state.apply_event(&Event::JobCompleted { job_id: id });
    let completed_at_first = state.get_job(&id).unwrap().completed_at_ms;

    // ...and again as a simulated WAL replay after a restart.
    let mut replay_wal = Wal::open(&wal_path, 0).unwrap();
    while let Some(entry) = replay_wal.next_unprocessed().unwrap() {
        state.apply_event(&entry.event);
    }

    assert_eq!(state.get_job(&id).unwrap().status, JobStatus::Completed);
    assert_eq!(state.get_job(&id).unwrap().completed_at_ms, completed_at_first);
}

#[test]
fn snapshot_roundtrips_through_zstd() {
    let dir = tempdir().unwrap();
    let mut store = StateStore::open(dir.path().join("state.wal"), 0).unwrap();
    let job = Job::builder().build();
    let id = job.id;
    store.state_mut().insert_job(job);

    let snapshot_path = dir.path().join("snapshot.zst");
    store.save_snapshot(&snapshot_path).unwrap();

    let doc = StateStore::read_snapshot(&snapshot_path).unwrap();
    assert_eq!(doc["v"], SNAPSHOT_VERSION);
    assert!(doc["state"]["jobs"].as_object().unwrap().contains_key(&id.to_string()));
}
