// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task lifecycle event handlers (I1, I2).

use dalston_core::{Event, TaskStatus};

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::TaskReady { task_id, .. } => {
            if let Some(task) = state.tasks.get_mut(task_id) {
                if task.status == TaskStatus::Pending {
                    task.status = TaskStatus::Ready;
                }
            }
        }

        Event::TaskStarted { task_id, instance_id, lease_deadline_ms, .. } => {
            if let Some(task) = state.tasks.get_mut(task_id) {
                // Guard the attempt counter: only bump it on an actual
                // lease handoff, not on a duplicate replay of this event.
                if task.lease_holder != Some(*instance_id) || task.status != TaskStatus::Running {
                    task.attempt = task.attempt.saturating_add(1);
                }
                task.status = TaskStatus::Running;
                task.lease_holder = Some(*instance_id);
                task.lease_deadline_ms = Some(*lease_deadline_ms);
            }
        }

        // I2: a completion or failure is only honored from the instance
        // that currently holds the lease — a straggling report from a
        // instance whose lease already expired and was reassigned must
        // not clobber the newer attempt's state.
        Event::TaskCompleted { task_id, instance_id, outputs, .. } => {
            if let Some(task) = state.tasks.get_mut(task_id) {
                if task.lease_matches(*instance_id) {
                    task.status = TaskStatus::Completed;
                    task.outputs = outputs.clone();
                    task.lease_holder = None;
                    task.lease_deadline_ms = None;
                }
            }
        }

        Event::TaskFailed { task_id, instance_id, error, .. } => {
            if let Some(task) = state.tasks.get_mut(task_id) {
                if task.lease_matches(*instance_id) {
                    task.status = TaskStatus::Failed;
                    task.error = Some(error.clone());
                    task.lease_holder = None;
                    task.lease_deadline_ms = None;
                }
            }
        }

        Event::TaskCancelled { task_id, .. } => {
            if let Some(task) = state.tasks.get_mut(task_id) {
                task.status = TaskStatus::Cancelled;
                task.lease_holder = None;
                task.lease_deadline_ms = None;
            }
        }

        // The lease expired before the instance reported back; release it
        // so the scheduler can re-dispatch a fresh attempt (§4.3, §4.4).
        Event::TaskHeartbeatExpired { task_id, .. } => {
            if let Some(task) = state.tasks.get_mut(task_id) {
                task.lease_holder = None;
                task.lease_deadline_ms = None;
                if !task.status.is_terminal() {
                    task.status = TaskStatus::Ready;
                }
            }
        }

        _ => {}
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
