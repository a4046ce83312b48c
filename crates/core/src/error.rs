// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared across crates (§7).
//!
//! `ErrorKind` is the ordering the spec defines, from most local to most
//! user-visible. Crate-local `thiserror` error types (in `dalston-catalog`,
//! `dalston-daemon`, `dalston-engine`) map their variants onto this kind so
//! retry policy and user-facing scrubbing can be written once, against the
//! kind, instead of once per crate's error enum.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Broker hiccup, storage timeout: retried internally, never surfaced
    /// unless retries are exhausted.
    TransientIo,
    /// GPU OOM, model warm-up: retried up to the cap.
    EngineTransient,
    /// Unsupported audio format, input too long: `retryable=false`.
    EnginePermanent,
    /// No catalogued engine supports the requirement.
    CatalogValidation,
    /// Selected engine has no registered instance.
    EngineUnavailable,
    /// I1/I2 breach or ordering anomaly: fatal, opaque to the user.
    Internal,
}

impl ErrorKind {
    /// Whether a task failing with this kind is eligible for the
    /// scheduler's retry policy (§4.3 "Retry policy").
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::TransientIo | ErrorKind::EngineTransient)
    }

    /// Whether this error should ever reach the API caller verbatim, vs.
    /// being scrubbed to an opaque indicator (§7 propagation policy).
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ErrorKind::Internal | ErrorKind::TransientIo)
    }
}

crate::simple_display! {
    ErrorKind {
        TransientIo => "transient_io",
        EngineTransient => "engine_transient",
        EnginePermanent => "engine_permanent",
        CatalogValidation => "catalog_validation",
        EngineUnavailable => "engine_unavailable",
        Internal => "internal",
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
