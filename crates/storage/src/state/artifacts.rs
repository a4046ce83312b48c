// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact lifecycle event handlers (§4.7, supplemented event).

use dalston_core::Event;

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    if let Event::ArtifactPurged { artifact_id, purged_at_ms } = event {
        if let Some(artifact) = state.artifacts.get_mut(artifact_id) {
            artifact.purged_at_ms = Some(*purged_at_ms);
        }
    }
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
