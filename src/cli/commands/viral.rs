//! smcron log-viral-tweets - Log own tweets that crossed an engagement threshold

use std::ops::ControlFlow;

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, RobotStatus, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::prune::engine::excerpt;
use crate::prune::{PruneEngine, Sleeper, ViralThreshold, ViralTweet};
use crate::remote::{CollectionClient, ResourceKind};

#[derive(Args, Debug)]
pub struct ViralArgs {
    /// Minimum likes (defaults to twitter.viral_likes)
    #[arg(long)]
    pub likes: Option<u64>,

    /// Minimum retweets (defaults to twitter.viral_retweets)
    #[arg(long)]
    pub retweets: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ViralOutput {
    threshold: ViralThreshold,
    scanned: u64,
    tweets: Vec<ViralTweet>,
    #[serde(skip)]
    halted: Option<String>,
}

pub fn run(ctx: &AppContext, args: &ViralArgs) -> Result<()> {
    let threshold = ViralThreshold {
        likes: args.likes.unwrap_or(ctx.config.twitter.viral_likes),
        retweets: args.retweets.unwrap_or(ctx.config.twitter.viral_retweets),
    };

    let mut engine = super::connect(ctx, ResourceKind::Posts)?;
    let spinner = super::scanning_spinner(ctx, ResourceKind::Posts);
    let result = collect(&mut engine, threshold);
    spinner.finish_and_clear();
    let output = result?;

    if ctx.robot_mode {
        let mut response = robot_ok(&output);
        if let Some(reason) = &output.halted {
            response.status = RobotStatus::Partial {
                completed: output.scanned,
                failed: 0,
            };
            response.warnings.push(reason.clone());
        }
        return emit_robot(&response);
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Viral tweets")
        .kv("Likes >=", &threshold.likes.to_string())
        .kv("Retweets >=", &threshold.retweets.to_string())
        .kv("Scanned", &output.scanned.to_string())
        .kv("Viral", &output.tweets.len().to_string());
    if !output.tweets.is_empty() {
        layout.blank().section("Tweets");
        for tweet in &output.tweets {
            layout.bullet(&format!(
                "{} ({} likes, {} retweets) {}",
                tweet.id,
                tweet.favorite_count,
                tweet.retweet_count,
                excerpt(&tweet.text)
            ));
        }
    }
    if let Some(reason) = &output.halted {
        layout.blank().section("Stopped early").bullet(reason);
    }
    emit_human(layout);
    Ok(())
}

fn collect<C, S>(engine: &mut PruneEngine<C, S>, threshold: ViralThreshold) -> Result<ViralOutput>
where
    C: CollectionClient,
    S: Sleeper,
{
    let kind = ResourceKind::Posts;
    info!("Fetching {kind}...");
    let mut tweets = Vec::new();
    let summary = engine.scan(kind, |_, item| {
        if threshold.matches(&item) {
            let tweet = ViralTweet::from(item);
            log_tweet(&tweet);
            tweets.push(tweet);
        }
        Ok(ControlFlow::Continue(()))
    })?;
    info!(scanned = summary.scanned, viral = tweets.len(), "Viral scan complete");

    Ok(ViralOutput {
        threshold,
        scanned: summary.scanned,
        tweets,
        halted: summary.halted,
    })
}

fn log_tweet(tweet: &ViralTweet) {
    info!(
        id = %tweet.id,
        created_at = ?tweet.created_at,
        favorite_count = tweet.favorite_count,
        retweet_count = tweet.retweet_count,
        hashtags = ?tweet.hashtags,
        mentions = ?tweet.mentions,
        retweeted = tweet.retweeted,
        "{}",
        tweet.text
    );
}
