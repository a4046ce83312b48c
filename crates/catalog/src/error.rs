// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog validation error and its structured details document (§4.1, §6.1).

use dalston_core::EngineDescriptorId;
use serde::Serialize;

/// Raised synchronously from `submit` when no catalogued engine satisfies
/// the requested `(stage, language, capabilities)` (§4.2).
#[derive(Debug, Clone, thiserror::Error)]
#[error("no engine satisfies stage={stage} language={language}")]
pub struct CatalogValidationError {
    pub stage: String,
    pub language: String,
    pub details: ValidationDetails,
}

/// The `{required, available_engines, suggestion}` document the gateway
/// echoes back in a `422` response (§6.1).
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetails {
    pub required: String,
    pub available_engines: Vec<EngineDescriptorId>,
    pub suggestion: String,
}

impl CatalogValidationError {
    /// The full `{error, message, stage, language, details}` document
    /// shape from §6.1, ready for the (out-of-scope) gateway to serialize.
    pub fn to_document(&self) -> serde_json::Value {
        serde_json::json!({
            "error": "catalog_validation",
            "message": self.to_string(),
            "stage": self.stage,
            "language": self.language,
            "details": {
                "required": self.details.required,
                "available_engines": self.details.available_engines,
                "suggestion": self.details.suggestion,
            },
        })
    }
}
