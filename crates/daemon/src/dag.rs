// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DAG Builder (C5, §4.2): turns one persisted job row into its task
//! graph — stage labels, selected engine per stage, and a dependency
//! adjacency list, expressed as [`Task`] rows ready for bulk insert.

use crate::error::SchedulerError;
use crate::registry::EngineRegistry;
use dalston_catalog::{Catalog, RequiredCapabilities};
use dalston_core::clock::Clock;
use dalston_core::engine::EngineDescriptor;
use dalston_core::job::{Job, SpeakerDetection, TimestampGranularity, MAX_CHANNELS};
use dalston_core::stage::Stage;
use dalston_core::task::{compute_timeout_s, Task, TaskId, TaskStatus};

/// One stage's selected engine plus the stages it depends on, before it is
/// materialized into a full [`Task`] row.
struct PlannedStage {
    stage: Stage,
    engine: EngineDescriptor,
    depends_on: Vec<Stage>,
}

/// Build the task graph for `job` (§4.2). Fails synchronously with a
/// catalog validation error if no catalogued engine can serve some stage,
/// or with [`SchedulerError::TooManyChannels`] if a `per_channel` request
/// exceeds [`MAX_CHANNELS`] (§9 open question, resolved: reject
/// synchronously rather than silently truncating channels).
///
/// Engine selection prefers registered/healthy engines over merely
/// catalogued ones (§4.2): among the Catalog's ordered candidates, the
/// first one with a dispatchable instance wins; if none has one, the
/// builder still selects the Catalog's top candidate (the task is built
/// `pending` and stays that way until an instance registers, per the
/// "Engine unavailable: wait" policy — §4.2 error conditions).
pub fn build_plan<C: Clock>(
    job: &Job,
    catalog: &Catalog,
    registry: &EngineRegistry<C>,
) -> Result<Vec<Task>, SchedulerError> {
    let channels = job.audio.channels.unwrap_or(1);
    if job.params.speaker_detection == SpeakerDetection::PerChannel && channels > MAX_CHANNELS {
        return Err(SchedulerError::TooManyChannels { max: MAX_CHANNELS as usize });
    }

    let language = &job.params.language;
    let word_timestamps = job.params.timestamps_granularity == TimestampGranularity::Word;
    let required = RequiredCapabilities { word_timestamps, streaming: false };

    let mut planned = Vec::new();

    let prepare_engine = select_engine(catalog, registry, Stage::Prepare, language, RequiredCapabilities::default())?;
    planned.push(PlannedStage { stage: Stage::Prepare, engine: prepare_engine, depends_on: vec![] });

    let transcript_stages: Vec<Stage> = if job.params.speaker_detection == SpeakerDetection::PerChannel {
        let n = channels.max(1);
        let mut stages = Vec::with_capacity(n as usize);
        for i in 0..n {
            let stage = Stage::TranscribeChannel(i);
            let engine = select_engine(catalog, registry, Stage::Transcribe, language, required)?;
            planned.push(PlannedStage { stage, engine, depends_on: vec![Stage::Prepare] });
            stages.push(stage);
        }
        stages
    } else {
        let engine = select_engine(catalog, registry, Stage::Transcribe, language, required)?;
        planned.push(PlannedStage { stage: Stage::Transcribe, engine, depends_on: vec![Stage::Prepare] });
        vec![Stage::Transcribe]
    };

    // `align` only makes sense for a single whole-file transcript; the
    // per-channel fork already produces independent streams merge handles.
    let mut latest_transcript_stages = transcript_stages.clone();
    if word_timestamps && transcript_stages.len() == 1 {
        let transcribe_engine = planned.iter().find(|p| p.stage == transcript_stages[0]).map(|p| &p.engine);
        let needs_align = transcribe_engine.map(|e| !e.capabilities.word_timestamps).unwrap_or(true);
        if needs_align {
            let engine = select_engine(catalog, registry, Stage::Align, language, RequiredCapabilities::default())?;
            planned.push(PlannedStage { stage: Stage::Align, engine, depends_on: vec![Stage::Transcribe] });
            latest_transcript_stages = vec![Stage::Align];
        }
    }

    let mut merge_depends_on = latest_transcript_stages.clone();

    if job.params.speaker_detection == SpeakerDetection::Diarize {
        let engine = select_engine(catalog, registry, Stage::Diarize, language, RequiredCapabilities::default())?;
        planned.push(PlannedStage { stage: Stage::Diarize, engine, depends_on: vec![Stage::Prepare] });
        merge_depends_on.push(Stage::Diarize);
    }

    if job.params.pii_detection {
        let engine = select_engine(catalog, registry, Stage::PiiDetect, language, RequiredCapabilities::default())?;
        planned.push(PlannedStage {
            stage: Stage::PiiDetect,
            engine,
            depends_on: latest_transcript_stages.clone(),
        });
        merge_depends_on.retain(|s| !latest_transcript_stages.contains(s));
        merge_depends_on.push(Stage::PiiDetect);

        if job.params.redact_pii_audio {
            let engine = select_engine(catalog, registry, Stage::AudioRedact, language, RequiredCapabilities::default())?;
            planned.push(PlannedStage {
                stage: Stage::AudioRedact,
                engine,
                depends_on: vec![Stage::PiiDetect, Stage::Prepare],
            });
            merge_depends_on.retain(|s| *s != Stage::PiiDetect);
            merge_depends_on.push(Stage::AudioRedact);
        }
    }

    let merge_engine = select_engine(catalog, registry, Stage::Merge, language, RequiredCapabilities::default())?;
    planned.push(PlannedStage { stage: Stage::Merge, engine: merge_engine, depends_on: merge_depends_on });

    Ok(planned
        .into_iter()
        .map(|p| {
            let timeout_s = compute_timeout_s(job.audio.duration_s, &p.engine);
            Task {
                id: TaskId::new(),
                job_id: job.id,
                stage: p.stage,
                engine_descriptor_id: p.engine.id.clone(),
                status: TaskStatus::Pending,
                attempt: 0,
                lease_holder: None,
                lease_deadline_ms: None,
                inputs: Vec::new(),
                outputs: Vec::new(),
                error: None,
                timeout_s,
                depends_on: p.depends_on,
            }
        })
        .collect())
}

fn select_engine<C: Clock>(
    catalog: &Catalog,
    registry: &EngineRegistry<C>,
    stage: Stage,
    language: &str,
    required: RequiredCapabilities,
) -> Result<EngineDescriptor, SchedulerError> {
    let candidates = catalog.lookup(stage, language, required)?;
    let chosen = candidates
        .iter()
        .find(|e| registry.has_dispatchable_instance(&e.id))
        .or_else(|| candidates.first())
        .ok_or_else(|| SchedulerError::Internal("catalog lookup returned no candidates".to_string()))?;
    Ok((*chosen).clone())
}

#[cfg(test)]
#[path = "dag_tests.rs"]
mod tests;
