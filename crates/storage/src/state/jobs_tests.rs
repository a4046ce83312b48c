use super::*;
use dalston_core::{Event, Job, JobStatus};

#[test]
fn job_created_is_a_replay_noop() {
    let mut state = MaterializedState::default();
    let job = Job::builder().build();
    let id = job.id;
    state.insert_job(job);

    apply(&mut state, &Event::JobCreated { job_id: id, correlation_id: None });

    assert_eq!(state.get_job(&id).unwrap().status, JobStatus::Pending);
}

#[test]
fn cancel_requested_moves_to_cancelling() {
    let mut state = MaterializedState::default();
    let job = Job::builder().status(JobStatus::Running).build();
    let id = job.id;
    state.insert_job(job);

    apply(&mut state, &Event::JobCancelRequested { job_id: id });

    assert_eq!(state.get_job(&id).unwrap().status, JobStatus::Cancelling);
}

#[test]
fn completed_sets_timestamp_and_progress() {
    let mut state = MaterializedState::default();
    let job = Job::builder().status(JobStatus::Running).build();
    let id = job.id;
    state.insert_job(job);

    apply(&mut state, &Event::JobCompleted { job_id: id });

    let job = state.get_job(&id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress_percent, 100);
    assert!(job.completed_at_ms.is_some());
}

#[test]
fn applying_completed_twice_is_idempotent() {
    let mut state = MaterializedState::default();
    let job = Job::builder().status(JobStatus::Running).build();
    let id = job.id;
    state.insert_job(job);

    apply(&mut state, &Event::JobCompleted { job_id: id });
    let first_completed_at = state.get_job(&id).unwrap().completed_at_ms;
    apply(&mut state, &Event::JobCompleted { job_id: id });

    assert_eq!(state.get_job(&id).unwrap().completed_at_ms, first_completed_at);
}

#[test]
fn failed_records_error() {
    let mut state = MaterializedState::default();
    let job = Job::builder().status(JobStatus::Running).build();
    let id = job.id;
    state.insert_job(job);

    apply(&mut state, &Event::JobFailed { job_id: id, error: "engine unavailable".to_string() });

    let job = state.get_job(&id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("engine unavailable"));
}
