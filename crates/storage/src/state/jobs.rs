// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle event handlers.

use dalston_core::{Event, JobStatus};

use super::helpers;
use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        // The full Job row is inserted directly by the caller at submit
        // time (`MaterializedState::insert_job`), before this event is
        // appended — `JobCreated` only carries `job_id` and a correlation
        // id (§6.2), not enough to reconstruct `JobParams`. Replaying it
        // is therefore a no-op here; it exists so the durable log has a
        // record of when the job entered the system.
        Event::JobCreated { .. } => {}

        Event::JobCancelRequested { job_id } => {
            if let Some(job) = state.jobs.get_mut(job_id) {
                let _ = job.transition(JobStatus::Cancelling);
            }
        }

        Event::JobCompleted { job_id } => {
            if let Some(job) = state.jobs.get_mut(job_id) {
                if job.transition(JobStatus::Completed).is_ok() {
                    job.completed_at_ms = Some(helpers::epoch_ms_now());
                    job.progress_percent = 100;
                }
            }
        }

        Event::JobFailed { job_id, error } => {
            if let Some(job) = state.jobs.get_mut(job_id) {
                if job.transition(JobStatus::Failed).is_ok() {
                    job.completed_at_ms = Some(helpers::epoch_ms_now());
                }
                job.error = Some(error.clone());
            }
        }

        Event::JobCancelled { job_id } => {
            if let Some(job) = state.jobs.get_mut(job_id) {
                if job.transition(JobStatus::Cancelled).is_ok() {
                    job.completed_at_ms = Some(helpers::epoch_ms_now());
                }
            }
        }

        _ => {}
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
