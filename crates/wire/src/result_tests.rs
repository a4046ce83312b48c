use super::*;
use dalston_core::TaskId;

#[test]
fn completed_serializes_with_status_tag() {
    let msg = EngineResultMessage::Completed {
        task_id: TaskId::new(),
        attempt: 1,
        outputs: vec![ResultOutput {
            artifact_type: "transcript.raw".to_string(),
            uri: "mem://out".to_string(),
            sensitivity: Sensitivity::Metadata,
            store: true,
            ttl_seconds: None,
            size_bytes: Some(10),
        }],
        stats: serde_json::json!({"word_count": 3}),
    };
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["status"], "completed");
    assert_eq!(json["outputs"][0]["type"], "transcript.raw");
}

#[test]
fn failed_roundtrips_with_retryable_flag() {
    let task_id = TaskId::new();
    let msg = EngineResultMessage::Failed {
        task_id,
        attempt: 2,
        error_kind: "engine_transient".to_string(),
        error_message: "gpu oom".to_string(),
        retryable: true,
        partial_outputs: Vec::new(),
    };
    let json = serde_json::to_string(&msg).unwrap();
    let back: EngineResultMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(back, msg);
    assert_eq!(back.task_id(), task_id);
    assert_eq!(back.attempt(), 2);
}
