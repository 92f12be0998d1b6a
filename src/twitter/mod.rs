//! Twitter v1.1 REST client.

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{Credentials, OAuthSigner};
pub use client::{TwitterClient, TwitterProvider};
pub use types::{parse_twitter_time, Tweet, User};
