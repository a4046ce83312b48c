// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciler: the startup-time (and periodic-tick) recovery pass that
//! ties the Scheduler's, Session Router's, and Engine Registry's own
//! recovery methods together into one call the daemon's main loop drives.

use crate::registry::EngineRegistry;
use crate::router::SessionRouter;
use crate::scheduler::{ReconcileReport, Scheduler};
use dalston_core::clock::Clock;
use dalston_core::session::SessionId;

/// Everything one reconciliation pass touched, for a single log line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub scheduler: ReconcileReportSummary,
    pub newly_unhealthy_instances: u32,
    pub sessions_interrupted: Vec<SessionId>,
    pub sessions_orphaned: Vec<SessionId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReportSummary {
    pub jobs_rederived: u32,
    pub tasks_redispatched: u32,
}

impl From<ReconcileReport> for ReconcileReportSummary {
    fn from(r: ReconcileReport) -> Self {
        Self { jobs_rederived: r.jobs_rederived, tasks_redispatched: r.tasks_redispatched }
    }
}

pub struct Reconciler<C: Clock> {
    scheduler: Scheduler<C>,
    router: SessionRouter<C>,
    registry: EngineRegistry<C>,
}

impl<C: Clock> Reconciler<C> {
    pub fn new(scheduler: Scheduler<C>, router: SessionRouter<C>, registry: EngineRegistry<C>) -> Self {
        Self { scheduler, router, registry }
    }

    /// Run at startup (recovering from whatever a crash mid-event left
    /// inconsistent) and on every health-monitor tick thereafter (picking
    /// up instances that just went stale).
    pub async fn run(&self) -> Result<ReconcileSummary, crate::error::SchedulerError> {
        let scheduler_report = self.scheduler.reconcile().await?;
        let newly_unhealthy = self.registry.mark_stale_unhealthy();
        let sessions_interrupted = self.router.interrupt_sessions_on_unhealthy_instances(&newly_unhealthy);
        let sessions_orphaned = self.router.reconcile_orphaned_sessions();

        let summary = ReconcileSummary {
            scheduler: scheduler_report.into(),
            newly_unhealthy_instances: newly_unhealthy.len() as u32,
            sessions_interrupted,
            sessions_orphaned,
        };
        tracing::info!(
            jobs_rederived = summary.scheduler.jobs_rederived,
            tasks_redispatched = summary.scheduler.tasks_redispatched,
            newly_unhealthy_instances = summary.newly_unhealthy_instances,
            sessions_interrupted = summary.sessions_interrupted.len(),
            sessions_orphaned = summary.sessions_orphaned.len(),
            "reconcile pass complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
