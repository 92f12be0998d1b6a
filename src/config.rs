use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SmError};

const ENV_PREFIX: &str = "SMCRON";
const SETTINGS_FILE: &str = "settings.toml";
const SECRETS_FILE: &str = ".secrets.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub plot: PlotConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path (or `SMCRON_CONFIG`) replaces the default lookup.
    /// Otherwise `settings.toml` and then `.secrets.toml` are layered from the
    /// user config directory. Environment overrides are applied last.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var(format!("{ENV_PREFIX}_CONFIG")).ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                SmError::MissingConfig(format!("config file {} not found", path.display()))
            })?;
            config.merge_patch(patch);
        } else if let Some(dir) = Self::default_dir() {
            for name in [SETTINGS_FILE, SECRETS_FILE] {
                if let Some(patch) = Self::load_patch(&dir.join(name))? {
                    config.merge_patch(patch);
                }
            }
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Directory holding `settings.toml` and `.secrets.toml`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("smcron"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SmError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SmError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.twitter {
            self.twitter.merge(patch);
        }
        if let Some(patch) = patch.logging {
            self.logging.merge(patch);
        }
        if let Some(patch) = patch.plot {
            self.plot.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    pub(crate) fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };
        let tw = &mut self.twitter;

        if let Some(value) = env.string("TWITTER_API_KEY") {
            tw.api_key = value;
        }
        if let Some(value) = env.string("TWITTER_API_SECRET_KEY") {
            tw.api_secret_key = value;
        }
        if let Some(value) = env.string("TWITTER_ACCESS_TOKEN") {
            tw.access_token = value;
        }
        if let Some(value) = env.string("TWITTER_ACCESS_TOKEN_SECRET") {
            tw.access_token_secret = value;
        }
        if let Some(value) = env.string("TWITTER_API_BASE_URL") {
            tw.api_base_url = value;
        }
        if let Some(value) = env.parse::<u64>("TWITTER_TIMEOUT_SECS")? {
            tw.timeout_secs = value;
        }
        if let Some(value) = env.bool("TWITTER_WAIT_ON_RATE_LIMIT") {
            tw.wait_on_rate_limit = value;
        }
        if let Some(value) = env.duration("TWITTER_RATE_LIMIT_SLEEP")? {
            tw.rate_limit_sleep = value;
        }
        if let Some(value) = env.parse::<u32>("TWITTER_TWEET_PRUNE_DAYS")? {
            tw.tweet_prune_days = value;
        }
        if let Some(value) = env.parse::<u32>("TWITTER_FRIEND_PRUNE_DAYS")? {
            tw.friend_prune_days = value;
        }
        if let Some(value) = env.bool("TWITTER_IS_DELETE_LIKED") {
            tw.is_delete_liked = value;
        }
        if let Some(value) = env.parse::<u64>("TWITTER_VIRAL_LIKES")? {
            tw.viral_likes = value;
        }
        if let Some(value) = env.parse::<u64>("TWITTER_VIRAL_RETWEETS")? {
            tw.viral_retweets = value;
        }
        if let Some(value) = env.parse::<u32>("TWITTER_TWEET_PAGE_SIZE")? {
            tw.tweet_page_size = value;
        }
        if let Some(value) = env.parse::<u32>("TWITTER_FRIEND_PAGE_SIZE")? {
            tw.friend_page_size = value;
        }

        if let Some(value) = env.string("LOGGING_FILE") {
            self.logging.file = Some(PathBuf::from(value));
        }
        if let Some(value) = env.bool("LOGGING_JSON") {
            self.logging.json = value;
        }

        if let Some(value) = env.string("PLOT_UTC_OFFSET") {
            self.plot.utc_offset = value;
        }
        if let Some(value) = env.string("PLOT_OUTPUT") {
            self.plot.output = PathBuf::from(value);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret_key: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub access_token_secret: String,
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default)]
    pub timeout_secs: u64,
    #[serde(default)]
    pub wait_on_rate_limit: bool,
    #[serde(default, with = "humantime_serde")]
    pub rate_limit_sleep: Duration,
    #[serde(default)]
    pub tweet_prune_days: u32,
    #[serde(default)]
    pub friend_prune_days: u32,
    #[serde(default)]
    pub is_delete_liked: bool,
    #[serde(default)]
    pub viral_likes: u64,
    #[serde(default)]
    pub viral_retweets: u64,
    #[serde(default)]
    pub tweet_page_size: u32,
    #[serde(default)]
    pub friend_page_size: u32,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret_key: String::new(),
            access_token: String::new(),
            access_token_secret: String::new(),
            api_base_url: "https://api.twitter.com/1.1".to_string(),
            timeout_secs: 30,
            wait_on_rate_limit: true,
            rate_limit_sleep: Duration::from_secs(15 * 60),
            tweet_prune_days: 365,
            friend_prune_days: 365,
            is_delete_liked: false,
            viral_likes: 10,
            viral_retweets: 5,
            tweet_page_size: 100,
            friend_page_size: 200,
        }
    }
}

impl TwitterConfig {
    fn merge(&mut self, patch: TwitterPatch) {
        if let Some(value) = patch.api_key {
            self.api_key = value;
        }
        if let Some(value) = patch.api_secret_key {
            self.api_secret_key = value;
        }
        if let Some(value) = patch.access_token {
            self.access_token = value;
        }
        if let Some(value) = patch.access_token_secret {
            self.access_token_secret = value;
        }
        if let Some(value) = patch.api_base_url {
            self.api_base_url = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = patch.wait_on_rate_limit {
            self.wait_on_rate_limit = value;
        }
        if let Some(value) = patch.rate_limit_sleep {
            self.rate_limit_sleep = value;
        }
        if let Some(value) = patch.tweet_prune_days {
            self.tweet_prune_days = value;
        }
        if let Some(value) = patch.friend_prune_days {
            self.friend_prune_days = value;
        }
        if let Some(value) = patch.is_delete_liked {
            self.is_delete_liked = value;
        }
        if let Some(value) = patch.viral_likes {
            self.viral_likes = value;
        }
        if let Some(value) = patch.viral_retweets {
            self.viral_retweets = value;
        }
        if let Some(value) = patch.tweet_page_size {
            self.tweet_page_size = value;
        }
        if let Some(value) = patch.friend_page_size {
            self.friend_page_size = value;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Append log lines to this file in addition to stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn merge(&mut self, patch: LoggingPatch) {
        if let Some(value) = patch.file {
            self.file = Some(value);
        }
        if let Some(value) = patch.json {
            self.json = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default)]
    pub utc_offset: String,
    #[serde(default)]
    pub output: PathBuf,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            utc_offset: "+00:00".to_string(),
            output: PathBuf::from("twitter_heatmap.svg"),
        }
    }
}

impl PlotConfig {
    fn merge(&mut self, patch: PlotPatch) {
        if let Some(value) = patch.utc_offset {
            self.utc_offset = value;
        }
        if let Some(value) = patch.output {
            self.output = value;
        }
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::from_str(self.utc_offset.trim()).map_err(|err| {
            SmError::Config(format!(
                "invalid plot.utc_offset {:?} (expected e.g. -05:00): {err}",
                self.utc_offset
            ))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub twitter: Option<TwitterPatch>,
    pub logging: Option<LoggingPatch>,
    pub plot: Option<PlotPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TwitterPatch {
    pub api_key: Option<String>,
    pub api_secret_key: Option<String>,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub wait_on_rate_limit: Option<bool>,
    #[serde(default, with = "humantime_serde")]
    pub rate_limit_sleep: Option<Duration>,
    pub tweet_prune_days: Option<u32>,
    pub friend_prune_days: Option<u32>,
    pub is_delete_liked: Option<bool>,
    pub viral_likes: Option<u64>,
    pub viral_retweets: Option<u64>,
    pub tweet_page_size: Option<u32>,
    pub friend_page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LoggingPatch {
    pub file: Option<PathBuf>,
    pub json: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PlotPatch {
    pub utc_offset: Option<String>,
    pub output: Option<PathBuf>,
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(&format!("{ENV_PREFIX}_{key}"))
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.string(key).map(|value| {
            matches!(
                value.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.string(key) {
            Some(value) => value.trim().parse::<T>().map(Some).map_err(|err| {
                SmError::Config(format!("invalid {ENV_PREFIX}_{key} value {value}: {err}"))
            }),
            None => Ok(None),
        }
    }

    fn duration(&self, key: &str) -> Result<Option<Duration>> {
        match self.string(key) {
            Some(value) => humantime_serde::re::humantime::parse_duration(value.trim())
                .map(Some)
                .map_err(|err| {
                    SmError::Config(format!("invalid {ENV_PREFIX}_{key} value {value}: {err}"))
                }),
            None => Ok(None),
        }
    }
}
