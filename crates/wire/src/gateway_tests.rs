use super::*;
use dalston_core::{Job, JobStatus, Task};

#[test]
fn job_record_mirrors_core_job_fields() {
    let job = Job::builder().status(JobStatus::Running).progress_percent(42).build();
    let record = JobRecord::from(&job);
    assert_eq!(record.id, job.id);
    assert_eq!(record.status, JobStatus::Running);
    assert_eq!(record.progress_percent, 42);
}

#[test]
fn task_record_drops_lease_and_io_fields() {
    let task = Task::builder().attempt(2).build();
    let record = TaskRecord::from(&task);
    assert_eq!(record.id, task.id);
    assert_eq!(record.attempt, 2);
}

#[test]
fn submit_request_defaults_pii_flags_to_false() {
    let json = r#"{
        "tenant_id": "t1",
        "source_uri": "s3://x",
        "model": "fast",
        "language": "auto",
        "speaker_detection": "none",
        "timestamps_granularity": "word"
    }"#;
    let req: SubmitRequest = serde_json::from_str(json).unwrap();
    assert!(!req.pii_detection);
    assert!(!req.redact_pii_audio);
    assert!(req.retention_policy.is_none());
}
