//! Viral tweet detection over the same paginated scan used for pruning.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::remote::RemoteItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViralThreshold {
    pub likes: u64,
    pub retweets: u64,
}

impl ViralThreshold {
    /// A tweet is viral when either count reaches its threshold.
    pub fn matches(&self, item: &RemoteItem) -> bool {
        item.engagement.as_ref().is_some_and(|engagement| {
            engagement.like_count >= self.likes || engagement.repost_count >= self.retweets
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViralTweet {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub favorite_count: u64,
    pub retweet_count: u64,
    pub text: String,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub retweeted: bool,
}

impl From<RemoteItem> for ViralTweet {
    fn from(item: RemoteItem) -> Self {
        let engagement = item.engagement.unwrap_or_default();
        Self {
            id: item.id,
            created_at: item.created_at,
            favorite_count: engagement.like_count,
            retweet_count: engagement.repost_count,
            text: item.excerpt,
            hashtags: item.hashtags,
            mentions: item.mentions,
            retweeted: engagement.reposted_by_self,
        }
    }
}
