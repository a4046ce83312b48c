// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline stage labels (§3.2, §4.2, GLOSSARY).
//!
//! Most stages are fixed labels, but per-channel transcription fans out
//! into `transcribe_ch0`, `transcribe_ch1`, ... depending on the job's
//! channel count, so `Stage` carries an index for that one variant instead
//! of being a plain enum.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Prepare,
    Transcribe,
    TranscribeChannel(u32),
    Align,
    Diarize,
    PiiDetect,
    AudioRedact,
    Merge,
}

impl Stage {
    /// Parse a stage label as it appears on the wire / in storage.
    pub fn parse(label: &str) -> Option<Self> {
        Some(match label {
            "prepare" => Stage::Prepare,
            "transcribe" => Stage::Transcribe,
            "align" => Stage::Align,
            "diarize" => Stage::Diarize,
            "pii_detect" => Stage::PiiDetect,
            "audio_redact" => Stage::AudioRedact,
            "merge" => Stage::Merge,
            other => {
                let idx = other.strip_prefix("transcribe_ch")?;
                Stage::TranscribeChannel(idx.parse().ok()?)
            }
        })
    }

    /// Whether this stage is any transcribe variant (whole-file or per-channel).
    pub fn is_transcribe(&self) -> bool {
        matches!(self, Stage::Transcribe | Stage::TranscribeChannel(_))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Prepare => f.write_str("prepare"),
            Stage::Transcribe => f.write_str("transcribe"),
            Stage::TranscribeChannel(i) => write!(f, "transcribe_ch{i}"),
            Stage::Align => f.write_str("align"),
            Stage::Diarize => f.write_str("diarize"),
            Stage::PiiDetect => f.write_str("pii_detect"),
            Stage::AudioRedact => f.write_str("audio_redact"),
            Stage::Merge => f.write_str("merge"),
        }
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
