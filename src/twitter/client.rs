//! Blocking v1.1 client.
//!
//! One request is in flight at a time. Rate limits and exhausted quotas are
//! reported as distinct error variants so the page cursor can react to them.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::auth::{Credentials, OAuthSigner, encode};
use super::types::{ApiErrors, CursoredUsers, Tweet, User};
use crate::config::TwitterConfig;
use crate::error::{Result, SmError};
use crate::remote::{Account, CollectionClient, CredentialProvider, Page, RemoteItem, ResourceKind};

/// API error codes that mean a quota is used up for the day rather than for
/// the current rate-limit window.
const HARD_QUOTA_CODES: &[i64] = &[161, 185];

const USAGE_CAP_MARKER: &str = "UsageCapExceeded";

pub struct TwitterClient {
    http: Client,
    base_url: String,
    signer: OAuthSigner,
}

impl TwitterClient {
    pub fn new(config: &TwitterConfig, credentials: Credentials) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("smcron/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| SmError::Config(format!("twitter http client: {err}")))?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            signer: OAuthSigner::new(credentials),
        })
    }

    pub fn verify_credentials(&self) -> Result<Account> {
        let user: User = self.get("account/verify_credentials.json", Vec::new())?;
        Ok(Account::from(user))
    }

    pub fn user_timeline(&self, max_id: Option<u64>, count: u32) -> Result<Vec<Tweet>> {
        let mut params = vec![
            ("count".to_string(), count.to_string()),
            ("tweet_mode".to_string(), "extended".to_string()),
        ];
        if let Some(max_id) = max_id {
            params.push(("max_id".to_string(), max_id.to_string()));
        }
        self.get("statuses/user_timeline.json", params)
    }

    pub fn friends(&self, cursor: &str, count: u32) -> Result<CursoredUsers> {
        self.get("friends/list.json", cursored_params(cursor, count))
    }

    pub fn followers(&self, cursor: &str, count: u32) -> Result<CursoredUsers> {
        self.get("followers/list.json", cursored_params(cursor, count))
    }

    pub fn destroy_status(&self, id: &str) -> Result<()> {
        self.post(&format!("statuses/destroy/{id}.json"), Vec::new())
    }

    pub fn destroy_friendship(&self, user_id: &str) -> Result<()> {
        self.post(
            "friendships/destroy.json",
            vec![("user_id".to_string(), user_id.to_string())],
        )
    }

    fn get<T: DeserializeOwned>(&self, path: &str, params: Vec<(String, String)>) -> Result<T> {
        let response = self.send(Method::GET, path, &params)?;
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn post(&self, path: &str, params: Vec<(String, String)>) -> Result<()> {
        self.send(Method::POST, path, &params)?;
        Ok(())
    }

    fn send(&self, method: Method, path: &str, params: &[(String, String)]) -> Result<Response> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let authorization = self.signer.authorization(method.as_str(), &url, params);

        let full_url = if params.is_empty() {
            url
        } else {
            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            format!("{url}?{query}")
        };

        debug!(%method, url = %full_url, "twitter request");
        let response = self
            .http
            .request(method, &full_url)
            .header(AUTHORIZATION, authorization)
            .send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let headers = response.headers().clone();
        let body = response.text().unwrap_or_default();
        Err(classify_failure(status, &headers, &body))
    }
}

impl CollectionClient for TwitterClient {
    fn fetch_page(
        &mut self,
        kind: ResourceKind,
        token: Option<&str>,
        page_size: u32,
    ) -> Result<Page> {
        match kind {
            ResourceKind::Posts => {
                let max_id = token
                    .map(|raw| {
                        raw.parse::<u64>().map_err(|err| {
                            SmError::Config(format!("invalid timeline token {raw}: {err}"))
                        })
                    })
                    .transpose()?;
                let tweets = self.user_timeline(max_id, page_size)?;
                // Next page holds everything older than the oldest id seen.
                let next = tweets
                    .iter()
                    .filter_map(|tweet| tweet.id_str.parse::<u64>().ok())
                    .min()
                    .and_then(|oldest| oldest.checked_sub(1))
                    .map(|id| id.to_string());
                Ok(Page {
                    items: tweets.into_iter().map(RemoteItem::from).collect(),
                    next,
                })
            }
            ResourceKind::Connections | ResourceKind::Followers => {
                let cursor = token.unwrap_or("-1");
                let page = if kind == ResourceKind::Connections {
                    self.friends(cursor, page_size)?
                } else {
                    self.followers(cursor, page_size)?
                };
                let next = match page.next_cursor_str.as_str() {
                    "" | "0" => None,
                    other => Some(other.to_string()),
                };
                Ok(Page {
                    items: page.users.into_iter().map(RemoteItem::from).collect(),
                    next,
                })
            }
        }
    }

    fn delete(&mut self, kind: ResourceKind, item: &RemoteItem) -> Result<()> {
        match kind {
            ResourceKind::Posts => self.destroy_status(&item.id),
            ResourceKind::Connections => self.destroy_friendship(&item.id),
            ResourceKind::Followers => Err(SmError::Unsupported(
                "followers cannot be removed".to_string(),
            )),
        }
    }
}

/// Builds a [`TwitterClient`] from configuration and verifies it.
pub struct TwitterProvider {
    config: TwitterConfig,
}

impl TwitterProvider {
    pub fn new(config: TwitterConfig) -> Self {
        Self { config }
    }
}

impl CredentialProvider for TwitterProvider {
    type Client = TwitterClient;

    fn authenticate(&self) -> Result<(TwitterClient, Account)> {
        info!("Authenticating...");
        let credentials = Credentials::from_config(&self.config)?;
        let client = TwitterClient::new(&self.config, credentials)?;
        let account = client.verify_credentials().map_err(|err| match err {
            SmError::Api {
                status: 403,
                message,
                ..
            } => SmError::Authentication(message),
            other => other,
        })?;
        info!(
            "Authenticated as {} with {} tweets",
            account.screen_name, account.statuses_count
        );
        Ok((client, account))
    }
}

fn cursored_params(cursor: &str, count: u32) -> Vec<(String, String)> {
    vec![
        ("count".to_string(), count.to_string()),
        ("cursor".to_string(), cursor.to_string()),
        ("skip_status".to_string(), "false".to_string()),
        ("include_user_entities".to_string(), "false".to_string()),
    ]
}

fn classify_failure(status: StatusCode, headers: &HeaderMap, body: &str) -> SmError {
    let errors: ApiErrors = serde_json::from_str(body).unwrap_or_default();
    let first = errors.errors.first();
    let code = first.map(|entry| entry.code);
    let message = first
        .map(|entry| entry.message.clone())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    if code.is_some_and(|code| HARD_QUOTA_CODES.contains(&code)) || body.contains(USAGE_CAP_MARKER)
    {
        return SmError::HardQuota(message);
    }

    match status {
        StatusCode::UNAUTHORIZED => SmError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => SmError::RateLimited {
            retry_after: retry_after(headers, chrono::Utc::now().timestamp()),
        },
        _ => SmError::Api {
            status: status.as_u16(),
            code,
            message,
        },
    }
}

/// Delay advised by the server: `retry-after` seconds, or time until the
/// `x-rate-limit-reset` epoch.
///
/// A non-positive delay is not advice; `None` lets the cursor fall back to
/// `rate_limit_sleep` instead of retrying at once.
fn retry_after(headers: &HeaderMap, now: i64) -> Option<Duration> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
    };
    let wait = match header("retry-after") {
        Some(secs) => secs,
        None => header("x-rate-limit-reset")?.saturating_sub(now),
    };
    u64::try_from(wait)
        .ok()
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
}
