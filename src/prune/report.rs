use chrono::NaiveDate;
use serde::Serialize;

use super::policy::PrunePolicy;
use crate::remote::ResourceKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunOutcome {
    Completed,
    /// The run ended early on a hard quota; counts cover what was processed.
    Halted { reason: String },
}

/// Summary of one prune run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub kind: ResourceKind,
    pub dry_run: bool,
    pub reference_date: NaiveDate,
    pub policy: PrunePolicy,
    pub scanned: u64,
    pub stale: u64,
    pub deleted: u64,
    pub failed: u64,
    pub pauses: u32,
    pub outcome: RunOutcome,
}

impl PruneReport {
    pub fn new(
        kind: ResourceKind,
        dry_run: bool,
        reference_date: NaiveDate,
        policy: PrunePolicy,
    ) -> Self {
        Self {
            kind,
            dry_run,
            reference_date,
            policy,
            scanned: 0,
            stale: 0,
            deleted: 0,
            failed: 0,
            pauses: 0,
            outcome: RunOutcome::Completed,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self.outcome, RunOutcome::Halted { .. })
    }

    /// `(scanned, stale, deleted, failed)`
    pub fn counts(&self) -> (u64, u64, u64, u64) {
        (self.scanned, self.stale, self.deleted, self.failed)
    }
}
