use super::*;
use crate::job::JobId;

#[test]
fn serializes_with_tagged_type_field() {
    let job_id = JobId::new();
    let event = Event::JobCreated { job_id, correlation_id: Some("corr-1".into()) };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "job.created");
    assert_eq!(json["correlation_id"], "corr-1");
}

#[test]
fn unknown_type_tag_deserializes_to_custom() {
    let json = serde_json::json!({"type": "future.event", "foo": "bar"});
    let event: Event = serde_json::from_value(json).unwrap();
    assert_eq!(event, Event::Custom);
}

#[test]
fn job_id_extracts_for_all_job_and_task_events() {
    let job_id = JobId::new();
    let event = Event::JobCancelRequested { job_id };
    assert_eq!(event.job_id(), Some(job_id));
}

#[test]
fn custom_has_no_job_id() {
    assert_eq!(Event::Custom.job_id(), None);
}
