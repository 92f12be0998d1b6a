//! Age-based retention policy.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::remote::{RemoteItem, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrunePolicy {
    pub max_age_days: u32,
    /// Keep self-liked posts even when they are old enough to prune.
    pub exempt_if_flag_set: bool,
}

/// Outcome of evaluating one item against a [`PrunePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum PruneDecision {
    Fresh { age_days: i64 },
    /// Old enough, but self-liked and the policy exempts those.
    Exempt { age_days: i64 },
    Expired { age_days: i64 },
    /// No timestamp at all.
    NeverActive,
}

impl PruneDecision {
    pub fn is_stale(self) -> bool {
        matches!(self, Self::Expired { .. } | Self::NeverActive)
    }

    pub fn age_days(self) -> Option<i64> {
        match self {
            Self::Fresh { age_days } | Self::Exempt { age_days } | Self::Expired { age_days } => {
                Some(age_days)
            }
            Self::NeverActive => None,
        }
    }
}

impl PrunePolicy {
    pub fn new(max_age_days: u32, exempt_if_flag_set: bool) -> Self {
        Self {
            max_age_days,
            exempt_if_flag_set,
        }
    }

    /// Policy for tweets; `delete_liked` lifts the self-like exemption.
    pub fn for_posts(max_age_days: u32, delete_liked: bool) -> Self {
        Self::new(max_age_days, !delete_liked)
    }

    pub fn for_connections(max_age_days: u32) -> Self {
        Self::new(max_age_days, false)
    }

    /// Items dated strictly before this day are old enough to prune.
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.max_age_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn evaluate(&self, kind: ResourceKind, item: &RemoteItem, today: NaiveDate) -> PruneDecision {
        let Some(created_at) = item.created_at else {
            return PruneDecision::NeverActive;
        };
        let date = created_at.date_naive();
        let age_days = (today - date).num_days();

        match kind {
            ResourceKind::Posts => {
                if date >= self.cutoff(today) {
                    PruneDecision::Fresh { age_days }
                } else if item.liked_by_self() && self.exempt_if_flag_set {
                    PruneDecision::Exempt { age_days }
                } else {
                    PruneDecision::Expired { age_days }
                }
            }
            ResourceKind::Connections | ResourceKind::Followers => {
                if age_days > i64::from(self.max_age_days) {
                    PruneDecision::Expired { age_days }
                } else {
                    PruneDecision::Fresh { age_days }
                }
            }
        }
    }
}
