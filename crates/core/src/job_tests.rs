use super::*;

#[test]
fn pending_running_completed_is_legal() {
    let mut job = Job::builder().build();
    assert_eq!(job.status, JobStatus::Pending);
    job.transition(JobStatus::Running).unwrap();
    job.transition(JobStatus::Completed).unwrap();
    assert!(job.is_terminal());
}

#[test]
fn terminal_status_rejects_further_transitions() {
    let mut job = Job::builder().status(JobStatus::Completed).build();
    let err = job.transition(JobStatus::Running).unwrap_err();
    assert_eq!(err.from, JobStatus::Completed);
    assert_eq!(err.to, JobStatus::Running);
}

#[test]
fn cancelling_cannot_return_to_running() {
    let mut job = Job::builder().status(JobStatus::Cancelling).build();
    assert!(job.transition(JobStatus::Running).is_err());
    job.transition(JobStatus::Cancelled).unwrap();
}

#[test]
fn retention_days_purge_after() {
    assert_eq!(RetentionDays::TRANSIENT.purge_after_ms(1_000), Some(1_000));
    assert_eq!(RetentionDays::FOREVER.purge_after_ms(1_000), None);
    assert_eq!(
        RetentionDays::days(1).purge_after_ms(0),
        Some(24 * 60 * 60 * 1000)
    );
}
