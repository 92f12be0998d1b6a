//! Wire types for the v1.1 API and their mapping onto [`RemoteItem`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::remote::{Account, Engagement, RemoteItem};

/// Timestamp layout used by the v1.1 API, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const TWITTER_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Parse a v1.1 timestamp, falling back to RFC 3339.
pub fn parse_twitter_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, TWITTER_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
}

pub fn format_twitter_time(ts: &DateTime<Utc>) -> String {
    ts.format(TWITTER_TIME_FORMAT).to_string()
}

// Malformed timestamps become `None`; the policy treats them like absent ones.
fn de_twitter_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|raw| {
        let parsed = parse_twitter_time(raw);
        if parsed.is_none() {
            warn!(raw, "unreadable created_at");
        }
        parsed
    }))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id_str: String,
    #[serde(default, deserialize_with = "de_twitter_time")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub favorited: bool,
    #[serde(default)]
    pub retweeted: bool,
    #[serde(default)]
    pub favorite_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub entities: Entities,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Vec<Hashtag>,
    #[serde(default)]
    pub user_mentions: Vec<Mention>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hashtag {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mention {
    pub screen_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id_str: String,
    pub screen_name: String,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub statuses_count: u64,
    #[serde(default)]
    pub friends_count: u64,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub listed_count: u64,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserStatus {
    #[serde(default, deserialize_with = "de_twitter_time")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CursoredUsers {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub next_cursor_str: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrors {
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEntry {
    pub code: i64,
    pub message: String,
}

/// A connection as written by `dump-connections`, read back by the heatmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpedUser {
    pub id: String,
    pub screen_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DumpedStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpedStatus {
    pub created_at: String,
}

impl From<&RemoteItem> for DumpedUser {
    fn from(item: &RemoteItem) -> Self {
        Self {
            id: item.id.clone(),
            screen_name: item.excerpt.clone(),
            status: item.created_at.as_ref().map(|ts| DumpedStatus {
                created_at: format_twitter_time(ts),
            }),
        }
    }
}

impl From<Tweet> for RemoteItem {
    fn from(tweet: Tweet) -> Self {
        Self {
            id: tweet.id_str,
            created_at: tweet.created_at,
            excerpt: tweet.full_text.unwrap_or(tweet.text),
            engagement: Some(Engagement {
                liked_by_self: tweet.favorited,
                reposted_by_self: tweet.retweeted,
                like_count: tweet.favorite_count,
                repost_count: tweet.retweet_count,
            }),
            hashtags: tweet
                .entities
                .hashtags
                .into_iter()
                .map(|tag| tag.text)
                .collect(),
            mentions: tweet
                .entities
                .user_mentions
                .into_iter()
                .map(|mention| mention.screen_name)
                .collect(),
        }
    }
}

impl From<User> for RemoteItem {
    fn from(user: User) -> Self {
        Self {
            id: user.id_str,
            created_at: user.status.and_then(|status| status.created_at),
            excerpt: user.screen_name,
            engagement: None,
            hashtags: Vec::new(),
            mentions: Vec::new(),
        }
    }
}

impl From<User> for Account {
    fn from(user: User) -> Self {
        Self {
            id: user.id_str,
            screen_name: user.screen_name,
            statuses_count: user.statuses_count,
            friends_count: user.friends_count,
            followers_count: user.followers_count,
            listed_count: user.listed_count,
            verified: user.verified,
        }
    }
}
