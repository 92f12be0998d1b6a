//! Remote collection abstractions.
//!
//! The prune engine only talks to a remote service through these traits, so
//! the Twitter client and the scripted fakes used in tests are interchangeable.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which remote collection to page through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// The account's own tweets.
    Posts,
    /// Accounts the user follows.
    Connections,
    /// Accounts following the user. Can be paged and exported, never pruned.
    Followers,
}

impl ResourceKind {
    pub fn noun(self) -> &'static str {
        match self {
            Self::Posts => "tweets",
            Self::Connections => "friends",
            Self::Followers => "followers",
        }
    }

    pub fn is_prunable(self) -> bool {
        !matches!(self, Self::Followers)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// Engagement attributes, present for posts only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub liked_by_self: bool,
    pub reposted_by_self: bool,
    pub like_count: u64,
    pub repost_count: u64,
}

/// A post or a connection as seen during one page of iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    /// Post time, or the connection's last post time. `None` means never.
    pub created_at: Option<DateTime<Utc>>,
    /// Post text, or the connection's screen name.
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<Engagement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
}

impl RemoteItem {
    pub fn liked_by_self(&self) -> bool {
        self.engagement
            .as_ref()
            .is_some_and(|engagement| engagement.liked_by_self)
    }
}

/// One page of a remote collection.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<RemoteItem>,
    /// Token for the following page; `None` once the collection is exhausted.
    pub next: Option<String>,
}

/// The authenticated account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub screen_name: String,
    pub statuses_count: u64,
    pub friends_count: u64,
    pub followers_count: u64,
    pub listed_count: u64,
    pub verified: bool,
}

/// Fetch pages of a remote collection and delete items from it.
///
/// `fetch_page` reports a retryable rate limit as
/// [`SmError::RateLimited`](crate::SmError::RateLimited) and an exhausted quota
/// as [`SmError::HardQuota`](crate::SmError::HardQuota); every other error is
/// treated as fatal by the caller.
pub trait CollectionClient {
    fn fetch_page(
        &mut self,
        kind: ResourceKind,
        token: Option<&str>,
        page_size: u32,
    ) -> Result<Page>;

    fn delete(&mut self, kind: ResourceKind, item: &RemoteItem) -> Result<()>;
}

/// Produces an authenticated client handle.
pub trait CredentialProvider {
    type Client: CollectionClient;

    fn authenticate(&self) -> Result<(Self::Client, Account)>;
}
