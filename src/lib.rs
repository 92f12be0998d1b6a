//! smcron - social media cron
//!
//! Prunes old tweets and inactive friends from a Twitter account and renders
//! an activity heatmap from dumped follower data.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod plot;
pub mod prune;
pub mod remote;
pub mod test_utils;
pub mod twitter;

pub use error::{Result, SmError};
