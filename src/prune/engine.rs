//! Paginated prune engine.
//!
//! Drives a [`PageCursor`] over a [`CollectionClient`], evaluates every item
//! against a [`PrunePolicy`] and deletes the stale ones. Rate limits pause the
//! run through a [`Sleeper`]; hard quotas end it early with a partial report.

use std::ops::ControlFlow;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info, warn};

use super::cursor::{PageCursor, Step};
use super::policy::{PruneDecision, PrunePolicy};
use super::report::{PruneReport, RunOutcome};
use crate::config::TwitterConfig;
use crate::error::{Result, SmError};
use crate::remote::{Account, CollectionClient, CredentialProvider, RemoteItem, ResourceKind};

const EXCERPT_CHARS: usize = 80;

/// Blocks the run during a rate-limit pause.
pub trait Sleeper {
    fn sleep(&mut self, delay: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Authenticating,
    Scanning,
    RateLimitPaused,
    Done,
    Failed,
}

/// A state change, with the number of items scanned when it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: RunState,
    pub scanned: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub page_size: u32,
    pub wait_on_rate_limit: bool,
    pub rate_limit_sleep: Duration,
}

impl EngineOptions {
    pub fn from_config(config: &TwitterConfig, kind: ResourceKind) -> Self {
        let page_size = match kind {
            ResourceKind::Posts => config.tweet_page_size,
            ResourceKind::Connections | ResourceKind::Followers => config.friend_page_size,
        };
        Self {
            page_size,
            wait_on_rate_limit: config.wait_on_rate_limit,
            rate_limit_sleep: config.rate_limit_sleep,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned: u64,
    pub pauses: u32,
    pub halted: Option<String>,
}

pub struct PruneEngine<C, S> {
    client: C,
    sleeper: S,
    options: EngineOptions,
    today: NaiveDate,
    transitions: Vec<Transition>,
}

impl<C, S> PruneEngine<C, S>
where
    C: CollectionClient,
    S: Sleeper,
{
    /// `today` is the reference date for every age comparison in this run.
    pub fn new(client: C, sleeper: S, options: EngineOptions, today: NaiveDate) -> Self {
        Self {
            client,
            sleeper,
            options,
            today,
            transitions: Vec::new(),
        }
    }

    /// Authenticate through `provider` and build an engine around the client.
    pub fn connect<P>(
        provider: &P,
        sleeper: S,
        options: EngineOptions,
        today: NaiveDate,
    ) -> Result<(Self, Account)>
    where
        P: CredentialProvider<Client = C>,
    {
        let (client, account) = provider.authenticate().inspect_err(|err| {
            error!("Authentication failed: {err}");
        })?;
        let mut engine = Self::new(client, sleeper, options, today);
        engine.enter(RunState::Authenticating, 0);
        Ok((engine, account))
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn state(&self) -> Option<RunState> {
        self.transitions.last().map(|t| t.state)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Visit every item of `kind`, pausing on rate limits.
    ///
    /// Transport failures, and errors returned by `visit`, abort the scan. A
    /// hard quota, from the remote or from `visit` breaking, ends it early and
    /// is reported through [`ScanSummary::halted`].
    pub fn scan<F>(&mut self, kind: ResourceKind, mut visit: F) -> Result<ScanSummary>
    where
        F: FnMut(&mut C, RemoteItem) -> Result<ControlFlow<String>>,
    {
        let mut cursor = PageCursor::new(kind, self.options.page_size)
            .with_rate_limit(self.options.wait_on_rate_limit, self.options.rate_limit_sleep);
        let mut summary = ScanSummary::default();
        self.enter(RunState::Scanning, 0);

        loop {
            let step = match cursor.advance(&mut self.client) {
                Ok(step) => step,
                Err(err) => {
                    self.enter(RunState::Failed, summary.scanned);
                    return Err(err);
                }
            };
            match step {
                Step::Item(item) => {
                    summary.scanned += 1;
                    match visit(&mut self.client, item) {
                        Ok(ControlFlow::Continue(())) => {}
                        Ok(ControlFlow::Break(reason)) => {
                            self.halt(&mut summary, reason);
                            break;
                        }
                        Err(err) => {
                            self.enter(RunState::Failed, summary.scanned);
                            return Err(err);
                        }
                    }
                }
                Step::Paused(delay) => {
                    summary.pauses += 1;
                    self.enter(RunState::RateLimitPaused, summary.scanned);
                    info!("Sleeping for {}s", delay.as_secs());
                    self.sleeper.sleep(delay);
                    self.enter(RunState::Scanning, summary.scanned);
                }
                Step::Halted(reason) => {
                    self.halt(&mut summary, reason);
                    break;
                }
                Step::Done => {
                    self.enter(RunState::Done, summary.scanned);
                    break;
                }
            }
        }

        Ok(summary)
    }

    fn halt(&mut self, summary: &mut ScanSummary, reason: String) {
        error!(scanned = summary.scanned, "Stopping early: {reason}");
        self.enter(RunState::Failed, summary.scanned);
        summary.halted = Some(reason);
    }

    fn enter(&mut self, state: RunState, scanned: u64) {
        self.transitions.push(Transition { state, scanned });
    }

    pub fn prune(
        &mut self,
        kind: ResourceKind,
        policy: &PrunePolicy,
        dry_run: bool,
    ) -> Result<PruneReport> {
        if !kind.is_prunable() {
            return Err(SmError::Unsupported(format!("{kind} cannot be pruned")));
        }
        if dry_run {
            info!("DRY RUN ENABLED");
        }

        let today = self.today;
        let mut report = PruneReport::new(kind, dry_run, today, *policy);

        info!("Fetching {kind}...");
        let summary = self.scan(kind, |client, item| {
            let decision = policy.evaluate(kind, &item, today);
            if !decision.is_stale() {
                return Ok(ControlFlow::Continue(()));
            }
            report.stale += 1;
            log_decision(kind, &item, decision);

            if dry_run {
                return Ok(ControlFlow::Continue(()));
            }
            match client.delete(kind, &item) {
                Ok(()) => report.deleted += 1,
                // Quota and credential failures apply to every later delete too.
                Err(SmError::HardQuota(reason)) => {
                    report.failed += 1;
                    return Ok(ControlFlow::Break(reason));
                }
                Err(err @ SmError::Authentication(_)) => return Err(err),
                Err(err) => {
                    report.failed += 1;
                    error!(id = %item.id, "Failed to prune: {err}");
                }
            }
            Ok(ControlFlow::Continue(()))
        })?;

        report.scanned = summary.scanned;
        report.pauses = summary.pauses;
        match summary.halted {
            Some(reason) => {
                error!(
                    scanned = report.scanned,
                    deleted = report.deleted,
                    "Pruning halted early"
                );
                report.outcome = RunOutcome::Halted { reason };
            }
            None => info!(
                scanned = report.scanned,
                stale = report.stale,
                deleted = report.deleted,
                failed = report.failed,
                "Pruning complete"
            ),
        }

        Ok(report)
    }
}

fn log_decision(kind: ResourceKind, item: &RemoteItem, decision: PruneDecision) {
    if decision == PruneDecision::NeverActive {
        match kind {
            ResourceKind::Posts => warn!(
                id = %item.id,
                liked = item.liked_by_self(),
                "Tweet has no readable created_at; pruning it as stale"
            ),
            _ => info!(id = %item.id, "{} has never tweeted", item.excerpt),
        }
    }
    match decision.age_days() {
        Some(age_days) => info!(
            id = %item.id,
            age_days,
            excerpt = %excerpt(&item.excerpt),
            "Pruning"
        ),
        None => info!(id = %item.id, excerpt = %excerpt(&item.excerpt), "Pruning"),
    }
}

/// Single-line, length-limited rendering of an item's text for log lines.
pub fn excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(EXCERPT_CHARS - 1).collect();
    cut.push('…');
    cut
}
