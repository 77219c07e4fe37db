//! Reconciliation of scraped meetings against remote calendar events.

mod plan;
mod reconciler;
mod summary;

pub use plan::{Mutation, MutationKind, SyncPlan};
pub use reconciler::Reconciler;
pub use summary::SyncSummary;
