use super::*;
use dalston_core::{EngineDescriptorId, JobId, Stage, TaskId};

fn sample() -> EngineQueueMessage {
    EngineQueueMessage {
        task_id: TaskId::new(),
        job_id: JobId::new(),
        stage: Stage::Transcribe,
        engine_id: EngineDescriptorId::new("whisper-fast"),
        attempt: 1,
        lease_seconds: 60,
        inputs: vec![EngineQueueInput {
            artifact_type: "audio.mono_16k".to_string(),
            uri: "mem://a".to_string(),
            checksum: None,
        }],
        parameters: serde_json::json!({"language": "en"}),
        cancel_channel: "cancel://task/1".to_string(),
        deadline_at_ms: 1_000,
    }
}

#[test]
fn serializes_with_type_field_for_inputs() {
    let json = serde_json::to_value(sample().inputs.first().unwrap()).unwrap();
    assert_eq!(json["type"], "audio.mono_16k");
}

#[test]
fn roundtrips_through_json() {
    let msg = sample();
    let json = serde_json::to_string(&msg).unwrap();
    let back: EngineQueueMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(back, msg);
}

#[test]
fn per_channel_stage_carries_index_on_the_wire() {
    let mut msg = sample();
    msg.stage = Stage::TranscribeChannel(2);
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["stage"]["transcribe_channel"], 2);
}
