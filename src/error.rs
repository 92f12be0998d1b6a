//! Error types for smcron

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("quota exceeded: {0}")]
    HardQuota(String),

    #[error("api error (HTTP {status}, code {code:?}): {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("heatmap error: {0}")]
    Heatmap(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SmError {
    /// Stable machine-readable code used in robot output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::MissingConfig(_) => "missing_config",
            Self::Authentication(_) => "authentication",
            Self::RateLimited { .. } => "rate_limited",
            Self::HardQuota(_) => "hard_quota",
            Self::Api { .. } => "api",
            Self::Unsupported(_) => "unsupported",
            Self::Heatmap(_) => "heatmap",
            Self::Http(_) => "http",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, SmError>;
