// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dalston-catalog: the in-memory engine registry loaded once from a
//! static manifest (C1, §4.1).

pub mod error;
pub mod manifest;

use dalston_core::engine::{Capabilities, EngineDescriptor};
use dalston_core::{EngineDescriptorId, Stage};
use error::{CatalogValidationError, ValidationDetails};
use std::collections::HashMap;

/// Capabilities a job requires of the engine it is matched to — a subset
/// of [`Capabilities`] the job's request parameters imply (e.g. word
/// timestamps requested by the client).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequiredCapabilities {
    pub word_timestamps: bool,
    pub streaming: bool,
}

impl RequiredCapabilities {
    fn satisfied_by(&self, caps: &Capabilities) -> bool {
        (!self.word_timestamps || caps.word_timestamps) && (!self.streaming || caps.streaming)
    }
}

/// Immutable, process-global engine registry (§9 "Global state": "the
/// catalog is effectively process-global; model it as an immutable value
/// loaded once, passed by reference").
#[derive(Debug, Clone)]
pub struct Catalog {
    by_stage: HashMap<Stage, Vec<EngineDescriptor>>,
    aliases: HashMap<String, EngineDescriptorId>,
}

impl Catalog {
    pub fn load(descriptors: Vec<EngineDescriptor>) -> Self {
        let mut by_stage: HashMap<Stage, Vec<EngineDescriptor>> = HashMap::new();
        let mut aliases = HashMap::new();
        for descriptor in descriptors {
            for alias in &descriptor.aliases {
                aliases.insert(alias.clone(), descriptor.id.clone());
            }
            by_stage.entry(descriptor.stage).or_default().push(descriptor);
        }
        Self { by_stage, aliases }
    }

    pub fn from_manifest_str(source: &str) -> Result<Self, manifest::ManifestError> {
        Ok(Self::load(manifest::parse(source)?))
    }

    /// Resolve a user-facing model alias or a literal engine ID to an
    /// engine descriptor ID (§4.1).
    pub fn resolve_alias(&self, model: &str) -> Option<EngineDescriptorId> {
        if let Some(id) = self.aliases.get(model) {
            return Some(id.clone());
        }
        self.all().find(|e| e.id.as_str() == model).map(|e| e.id.clone())
    }

    pub fn get(&self, id: &EngineDescriptorId) -> Option<&EngineDescriptor> {
        self.all().find(|e| &e.id == id)
    }

    pub fn all(&self) -> impl Iterator<Item = &EngineDescriptor> {
        self.by_stage.values().flatten()
    }

    /// `(stage, language, required_capabilities)` → ordered list of
    /// catalogued engine descriptors that can satisfy the request,
    /// preferring GPU engines with explicit language support over
    /// wildcard engines, then breaking ties by declared RTF (§4.1).
    pub fn candidates(
        &self,
        stage: Stage,
        language: &str,
        required: RequiredCapabilities,
    ) -> Vec<&EngineDescriptor> {
        let mut matches: Vec<&EngineDescriptor> = self
            .by_stage
            .get(&stage)
            .into_iter()
            .flatten()
            .filter(|e| e.languages.covers(language))
            .filter(|e| required.satisfied_by(&e.capabilities))
            .collect();

        matches.sort_by(|a, b| {
            let gpu_rank = |e: &EngineDescriptor| std::cmp::Reverse(e.capabilities.uses_gpu());
            let explicit_rank = |e: &EngineDescriptor| e.languages.is_wildcard();
            let rtf = |e: &EngineDescriptor| e.rtf.gpu.or(e.rtf.cpu).unwrap_or(f64::MAX);
            gpu_rank(a)
                .cmp(&gpu_rank(b))
                .then(explicit_rank(a).cmp(&explicit_rank(b)))
                .then(rtf(a).partial_cmp(&rtf(b)).unwrap_or(std::cmp::Ordering::Equal))
        });
        matches
    }

    /// Look up candidates, failing with a catalog validation error
    /// carrying the list of available engines and a suggestion (§4.1).
    pub fn lookup(
        &self,
        stage: Stage,
        language: &str,
        required: RequiredCapabilities,
    ) -> Result<Vec<&EngineDescriptor>, CatalogValidationError> {
        let candidates = self.candidates(stage, language, required);
        if candidates.is_empty() {
            let available_engines: Vec<EngineDescriptorId> =
                self.by_stage.get(&stage).into_iter().flatten().map(|e| e.id.clone()).collect();
            let suggestion = if available_engines.is_empty() {
                format!("no engine is catalogued for stage {stage}")
            } else {
                format!(
                    "no catalogued {stage} engine supports language {language}; consider adding a wildcard engine"
                )
            };
            return Err(CatalogValidationError {
                stage: stage.to_string(),
                language: language.to_string(),
                details: ValidationDetails { required: format!("{stage}/{language}"), available_engines, suggestion },
            });
        }
        Ok(candidates)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
