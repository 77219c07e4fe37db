use std::fmt;

use crate::error::SyncError;
use crate::reconcile::plan::{MutationKind, SyncPlan};

/// Outcome of applying a plan. Always produced, even when mutations fail.
#[derive(Debug, Default)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub invalid: usize,
    pub duplicates: usize,
    pub total: usize,
    /// One entry per failed mutation, in execution order
    pub failures: Vec<SyncError>,
}

impl SyncSummary {
    /// Summary with the plan's non-mutation counters filled in.
    pub fn for_plan(plan: &SyncPlan) -> Self {
        SyncSummary {
            unchanged: plan.unchanged,
            invalid: plan.invalid,
            duplicates: plan.duplicates,
            total: plan.total,
            ..Default::default()
        }
    }

    pub fn record_success(&mut self, kind: MutationKind) {
        match kind {
            MutationKind::Create => self.created += 1,
            MutationKind::Update => self.updated += 1,
            MutationKind::Delete => self.deleted += 1,
        }
    }

    pub fn record_failure(&mut self, error: SyncError) {
        self.failed += 1;
        self.failures.push(error);
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} deleted, {} unchanged, {} total",
            self.created, self.updated, self.deleted, self.unchanged, self.total
        )?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        Ok(())
    }
}
