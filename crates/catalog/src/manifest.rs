// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk manifest format (HCL) describing every engine the deployment
//! knows about (§3.4, §4.1).
//!
//! ```hcl
//! engine "whisper-large-gpu" {
//!   stage       = "transcribe"
//!   languages   = "all"
//!   aliases     = ["accurate"]
//!   image       = "registry.internal/engines/whisper-large:v3"
//!   max_concurrency = 1
//!
//!   capabilities {
//!     word_timestamps = true
//!     gpu_required    = true
//!   }
//!
//!   rtf {
//!     gpu = 0.15
//!     cpu = 1.8
//!   }
//! }
//! ```

use dalston_core::engine::{Capabilities, EngineDescriptor, LanguageSupport, RtfEstimates};
use dalston_core::{EngineDescriptorId, Stage};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct ManifestFile {
    #[serde(default, rename = "engine")]
    pub engines: HashMap<String, RawEngine>,
}

#[derive(Debug, Deserialize)]
pub struct RawEngine {
    pub stage: String,
    #[serde(default = "default_languages")]
    pub languages: RawLanguages,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub image: String,
    #[serde(default = "default_concurrency")]
    pub max_concurrency: u32,
    #[serde(default)]
    pub capabilities: RawCapabilities,
    #[serde(default)]
    pub rtf: RawRtf,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawLanguages {
    Wildcard(String),
    List(Vec<String>),
}

fn default_languages() -> RawLanguages {
    RawLanguages::Wildcard("all".to_string())
}

fn default_concurrency() -> u32 {
    1
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCapabilities {
    #[serde(default)]
    pub word_timestamps: bool,
    #[serde(default)]
    pub streaming: bool,
    #[serde(default)]
    pub gpu_required: bool,
    #[serde(default)]
    pub gpu_optional: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawRtf {
    pub cpu: Option<f64>,
    pub gpu: Option<f64>,
}

/// Error parsing or validating the manifest file.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest at {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("failed to parse manifest HCL: {0}")]
    Parse(#[from] hcl::Error),
    #[error("engine {engine_id:?} declares unknown stage {stage:?}")]
    UnknownStage { engine_id: String, stage: String },
}

/// Parse an HCL manifest document into engine descriptors.
pub fn parse(source: &str) -> Result<Vec<EngineDescriptor>, ManifestError> {
    let file: ManifestFile = hcl::from_str(source)?;
    let mut descriptors = Vec::with_capacity(file.engines.len());
    for (id, raw) in file.engines {
        let stage = Stage::parse(&raw.stage).ok_or_else(|| ManifestError::UnknownStage {
            engine_id: id.clone(),
            stage: raw.stage.clone(),
        })?;
        let languages = match raw.languages {
            RawLanguages::Wildcard(s) if s.eq_ignore_ascii_case("all") => LanguageSupport::Wildcard,
            RawLanguages::Wildcard(s) => LanguageSupport::Explicit(vec![s]),
            RawLanguages::List(codes) => LanguageSupport::Explicit(codes),
        };
        descriptors.push(EngineDescriptor {
            id: EngineDescriptorId::new(id),
            stage,
            languages,
            capabilities: Capabilities {
                word_timestamps: raw.capabilities.word_timestamps,
                streaming: raw.capabilities.streaming,
                gpu_required: raw.capabilities.gpu_required,
                gpu_optional: raw.capabilities.gpu_optional,
            },
            rtf: RtfEstimates { cpu: raw.rtf.cpu, gpu: raw.rtf.gpu },
            max_concurrency: raw.max_concurrency,
            image: raw.image,
            aliases: raw.aliases,
        });
    }
    Ok(descriptors)
}

/// Load and parse a manifest file from disk.
pub fn load(path: &std::path::Path) -> Result<Vec<EngineDescriptor>, ManifestError> {
    let source = std::fs::read_to_string(path)
        .map_err(|source| ManifestError::Read { path: path.display().to_string(), source })?;
    parse(&source)
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
