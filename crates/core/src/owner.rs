// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owner identification for artifacts.
//!
//! An artifact is produced on behalf of either a batch job or a real-time
//! session (§3.3: "owner (job or session)"). This tagged union models that
//! ownership without an owning back-pointer (§9: cross-references are
//! modeled as tagged optional references plus explicit lookup, never as
//! owning back-pointers).

use crate::job::JobId;
use crate::session::SessionId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "owner_type", rename_all = "snake_case")]
pub enum OwnerId {
    Job(JobId),
    Session(SessionId),
}

use serde::{Deserialize, Serialize};

impl OwnerId {
    pub fn job(id: JobId) -> Self {
        OwnerId::Job(id)
    }

    pub fn session(id: SessionId) -> Self {
        OwnerId::Session(id)
    }

    pub fn as_job(&self) -> Option<JobId> {
        match self {
            OwnerId::Job(id) => Some(*id),
            OwnerId::Session(_) => None,
        }
    }

    pub fn as_session(&self) -> Option<SessionId> {
        match self {
            OwnerId::Session(id) => Some(*id),
            OwnerId::Job(_) => None,
        }
    }

    pub fn log(&self) -> String {
        match self {
            OwnerId::Job(id) => format!("job={id}"),
            OwnerId::Session(id) => format!("session={id}"),
        }
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerId::Job(id) => write!(f, "job:{id}"),
            OwnerId::Session(id) => write!(f, "session:{id}"),
        }
    }
}

impl From<JobId> for OwnerId {
    fn from(id: JobId) -> Self {
        OwnerId::Job(id)
    }
}

impl From<SessionId> for OwnerId {
    fn from(id: SessionId) -> Self {
        OwnerId::Session(id)
    }
}

#[cfg(test)]
#[path = "owner_tests.rs"]
mod tests;
