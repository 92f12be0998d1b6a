//! Scripted remote collection for exercising the engine without a network.
//!
//! A [`ScriptedClient`] replays a fixed sequence of fetch outcomes and keeps a
//! journal of every fetch, delete and (through [`RecordingSleeper`]) pause.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::error::{Result, SmError};
use crate::prune::Sleeper;
use crate::remote::{
    Account, CollectionClient, CredentialProvider, Engagement, Page, RemoteItem, ResourceKind,
};

type Journal = Rc<RefCell<Vec<String>>>;

#[derive(Debug, Clone)]
enum Scripted {
    Page(Vec<RemoteItem>),
    RateLimit(Option<Duration>),
    HardQuota(String),
    Failure(String),
}

#[derive(Debug, Clone)]
enum DeleteFailure {
    NotFound,
    Quota(String),
    Revoked,
}

#[derive(Debug, Default)]
pub struct ScriptedClient {
    script: VecDeque<Scripted>,
    pages_served: usize,
    tokens: Vec<Option<String>>,
    failing_deletes: HashMap<String, DeleteFailure>,
    deleted: Vec<String>,
    journal: Journal,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, items: Vec<RemoteItem>) -> Self {
        self.script.push_back(Scripted::Page(items));
        self
    }

    #[must_use]
    pub fn rate_limit(mut self, retry_after: Option<Duration>) -> Self {
        self.script.push_back(Scripted::RateLimit(retry_after));
        self
    }

    #[must_use]
    pub fn hard_quota(mut self, reason: &str) -> Self {
        self.script.push_back(Scripted::HardQuota(reason.to_string()));
        self
    }

    #[must_use]
    pub fn failure(mut self, message: &str) -> Self {
        self.script.push_back(Scripted::Failure(message.to_string()));
        self
    }

    #[must_use]
    pub fn fail_delete(mut self, id: &str) -> Self {
        self.failing_deletes
            .insert(id.to_string(), DeleteFailure::NotFound);
        self
    }

    /// Deleting `id` reports an exhausted quota.
    #[must_use]
    pub fn quota_on_delete(mut self, id: &str, reason: &str) -> Self {
        self.failing_deletes
            .insert(id.to_string(), DeleteFailure::Quota(reason.to_string()));
        self
    }

    /// Deleting `id` reports revoked credentials.
    #[must_use]
    pub fn revoked_on_delete(mut self, id: &str) -> Self {
        self.failing_deletes
            .insert(id.to_string(), DeleteFailure::Revoked);
        self
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.clone()
    }

    pub fn tokens_requested(&self) -> Vec<Option<String>> {
        self.tokens.clone()
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }

    fn record(&self, event: String) {
        self.journal.borrow_mut().push(event);
    }
}

impl CollectionClient for ScriptedClient {
    fn fetch_page(
        &mut self,
        _kind: ResourceKind,
        token: Option<&str>,
        _page_size: u32,
    ) -> Result<Page> {
        self.tokens.push(token.map(str::to_string));
        self.record(format!("fetch:{}", token.unwrap_or("start")));

        match self.script.pop_front() {
            Some(Scripted::Page(items)) => {
                self.pages_served += 1;
                let next = if self.script.is_empty() {
                    None
                } else {
                    Some(self.pages_served.to_string())
                };
                Ok(Page { items, next })
            }
            Some(Scripted::RateLimit(retry_after)) => Err(SmError::RateLimited { retry_after }),
            Some(Scripted::HardQuota(reason)) => Err(SmError::HardQuota(reason)),
            Some(Scripted::Failure(message)) => Err(SmError::Io(std::io::Error::other(message))),
            None => Ok(Page::default()),
        }
    }

    fn delete(&mut self, _kind: ResourceKind, item: &RemoteItem) -> Result<()> {
        if let Some(failure) = self.failing_deletes.get(&item.id).cloned() {
            self.record(format!("delete-failed:{}", item.id));
            return Err(match failure {
                DeleteFailure::NotFound => SmError::Api {
                    status: 404,
                    code: Some(144),
                    message: format!("No status found with ID {}", item.id),
                },
                DeleteFailure::Quota(reason) => SmError::HardQuota(reason),
                DeleteFailure::Revoked => {
                    SmError::Authentication("Invalid or expired token.".to_string())
                }
            });
        }
        self.record(format!("delete:{}", item.id));
        self.deleted.push(item.id.clone());
        Ok(())
    }
}

/// Records requested pauses instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    pub delays: Vec<Duration>,
    journal: Option<Journal>,
}

impl RecordingSleeper {
    /// Write pauses into `client`'s journal so they can be ordered against
    /// fetches and deletes.
    pub fn sharing(client: &ScriptedClient) -> Self {
        Self {
            delays: Vec::new(),
            journal: Some(Rc::clone(&client.journal)),
        }
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, delay: Duration) {
        self.delays.push(delay);
        if let Some(journal) = &self.journal {
            journal
                .borrow_mut()
                .push(format!("pause:{}", delay.as_secs()));
        }
    }
}

/// Hands out one prepared client, or refuses authentication.
pub struct StaticProvider {
    client: RefCell<Option<ScriptedClient>>,
    rejection: Option<String>,
}

impl StaticProvider {
    pub fn accepting(client: ScriptedClient) -> Self {
        Self {
            client: RefCell::new(Some(client)),
            rejection: None,
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            client: RefCell::new(None),
            rejection: Some(reason.to_string()),
        }
    }
}

impl CredentialProvider for StaticProvider {
    type Client = ScriptedClient;

    fn authenticate(&self) -> Result<(ScriptedClient, Account)> {
        if let Some(reason) = &self.rejection {
            return Err(SmError::Authentication(reason.clone()));
        }
        let client = self
            .client
            .borrow_mut()
            .take()
            .ok_or_else(|| SmError::Authentication("client already handed out".to_string()))?;
        let account = Account {
            id: "1".to_string(),
            screen_name: "tester".to_string(),
            ..Account::default()
        };
        Ok((client, account))
    }
}

fn noon(date: &str) -> chrono::DateTime<Utc> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap_or_else(|err| panic!("bad fixture date {date}: {err}"));
    Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap_or_default())
}

/// A connection whose last post was on `last_post` (`YYYY-MM-DD`), if ever.
pub fn item(id: &str, last_post: Option<&str>) -> RemoteItem {
    RemoteItem {
        id: id.to_string(),
        created_at: last_post.map(noon),
        excerpt: format!("user_{id}"),
        engagement: None,
        hashtags: Vec::new(),
        mentions: Vec::new(),
    }
}

/// A post created on `created` (`YYYY-MM-DD`).
pub fn post(id: &str, created: Option<&str>, liked: bool) -> RemoteItem {
    RemoteItem {
        id: id.to_string(),
        created_at: created.map(noon),
        excerpt: format!("post {id}"),
        engagement: Some(Engagement {
            liked_by_self: liked,
            ..Engagement::default()
        }),
        hashtags: Vec::new(),
        mentions: Vec::new(),
    }
}
