//! Explicit page cursor over a [`CollectionClient`].
//!
//! The cursor owns the pagination token and a buffer of unread items. A rate
//! limit leaves both untouched, so advancing again after a pause re-requests
//! only the page that failed; items already handed out are never fetched twice.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Result, SmError};
use crate::remote::{CollectionClient, RemoteItem, ResourceKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorState {
    Scanning,
    Paused { delay: Duration },
    Exhausted,
    Halted { reason: String },
}

#[derive(Debug)]
pub enum Step {
    Item(RemoteItem),
    /// The caller should wait `delay` before advancing again.
    Paused(Duration),
    /// The remote refuses further requests for this run.
    Halted(String),
    Done,
}

pub struct PageCursor {
    kind: ResourceKind,
    page_size: u32,
    token: Option<String>,
    started: bool,
    buffer: VecDeque<RemoteItem>,
    state: CursorState,
    wait_on_rate_limit: bool,
    fallback_delay: Duration,
    pages_fetched: u32,
}

impl PageCursor {
    pub fn new(kind: ResourceKind, page_size: u32) -> Self {
        Self {
            kind,
            page_size: page_size.max(1),
            token: None,
            started: false,
            buffer: VecDeque::new(),
            state: CursorState::Scanning,
            wait_on_rate_limit: true,
            fallback_delay: Duration::from_secs(15 * 60),
            pages_fetched: 0,
        }
    }

    /// Configure rate-limit handling. When `wait` is false a rate limit halts
    /// the cursor instead of pausing it.
    pub fn with_rate_limit(mut self, wait: bool, fallback_delay: Duration) -> Self {
        self.wait_on_rate_limit = wait;
        self.fallback_delay = fallback_delay;
        self
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn advance<C>(&mut self, client: &mut C) -> Result<Step>
    where
        C: CollectionClient + ?Sized,
    {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                self.state = CursorState::Scanning;
                return Ok(Step::Item(item));
            }

            match &self.state {
                CursorState::Exhausted => return Ok(Step::Done),
                CursorState::Halted { reason } => return Ok(Step::Halted(reason.clone())),
                CursorState::Scanning | CursorState::Paused { .. } => {}
            }

            if self.started && self.token.is_none() {
                self.state = CursorState::Exhausted;
                return Ok(Step::Done);
            }

            match client.fetch_page(self.kind, self.token.as_deref(), self.page_size) {
                Ok(page) => {
                    self.started = true;
                    self.pages_fetched += 1;
                    debug!(
                        kind = %self.kind,
                        page = self.pages_fetched,
                        items = page.items.len(),
                        "fetched page"
                    );
                    self.token = page.next;
                    self.buffer.extend(page.items);
                    self.state = CursorState::Scanning;
                }
                Err(SmError::RateLimited { retry_after }) => {
                    if !self.wait_on_rate_limit {
                        let reason =
                            "rate limit exceeded and wait_on_rate_limit is disabled".to_string();
                        self.state = CursorState::Halted {
                            reason: reason.clone(),
                        };
                        return Ok(Step::Halted(reason));
                    }
                    let delay = retry_after.unwrap_or(self.fallback_delay);
                    warn!("Rate limit exceeded");
                    self.state = CursorState::Paused { delay };
                    return Ok(Step::Paused(delay));
                }
                Err(SmError::HardQuota(reason)) => {
                    self.state = CursorState::Halted {
                        reason: reason.clone(),
                    };
                    return Ok(Step::Halted(reason));
                }
                Err(err) => return Err(err),
            }
        }
    }
}
