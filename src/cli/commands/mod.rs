//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};

pub mod completions;
pub mod dump;
pub mod heatmap;
pub mod prune_friends;
pub mod prune_tweets;
pub mod stats;
pub mod viral;

use crate::app::AppContext;
use crate::cli::output::{emit_human, emit_robot, report_layout, robot_report};
use crate::error::Result;
use crate::prune::{EngineOptions, PruneEngine, PrunePolicy, PruneReport, ThreadSleeper};
use crate::remote::ResourceKind;
use crate::twitter::{TwitterClient, TwitterProvider};

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::PruneTweets(args) => prune_tweets::run(ctx, args),
        Commands::PruneFriends(args) => prune_friends::run(ctx, args),
        Commands::LogViralTweets(args) => viral::run(ctx, args),
        Commands::LogStats(args) => stats::run(ctx, args),
        Commands::DumpConnections(args) => dump::run(ctx, args),
        Commands::TwitterHeatmap(args) => heatmap::run(ctx, args),
        Commands::Completions(args) => completions::run(args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Delete own tweets older than the configured age
    PruneTweets(prune_tweets::PruneTweetsArgs),

    /// Unfollow friends whose last tweet is older than the configured age
    PruneFriends(prune_friends::PruneFriendsArgs),

    /// Log own tweets above the like or retweet threshold
    LogViralTweets(viral::ViralArgs),

    /// Log follower, friend and listed counts for the account
    LogStats(stats::StatsArgs),

    /// Export friends or followers as a JSON user dump
    DumpConnections(dump::DumpArgs),

    /// Render a weekday/hour activity heatmap from user dumps
    TwitterHeatmap(heatmap::HeatmapArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Authenticated engine against the live API, using the run's reference date.
pub(crate) fn connect(
    ctx: &AppContext,
    kind: ResourceKind,
) -> Result<PruneEngine<TwitterClient, ThreadSleeper>> {
    let provider = TwitterProvider::new(ctx.config.twitter.clone());
    let options = EngineOptions::from_config(&ctx.config.twitter, kind);
    let (engine, _account) = PruneEngine::connect(&provider, ThreadSleeper, options, ctx.today)?;
    Ok(engine)
}

/// Shared body of `prune-tweets` and `prune-friends`.
pub(crate) fn run_prune(
    ctx: &AppContext,
    kind: ResourceKind,
    policy: PrunePolicy,
    dry_run: bool,
) -> Result<PruneReport> {
    let mut engine = connect(ctx, kind)?;
    let spinner = scanning_spinner(ctx, kind);
    let result = engine.prune(kind, &policy, dry_run);
    spinner.finish_and_clear();
    let report = result?;

    if ctx.robot_mode {
        emit_robot(&robot_report(&report))?;
    } else {
        emit_human(report_layout(&report));
    }
    Ok(report)
}

/// Spinner on stderr while a scan runs; hidden in robot or quiet mode.
pub(crate) fn scanning_spinner(ctx: &AppContext, kind: ResourceKind) -> ProgressBar {
    if ctx.robot_mode || ctx.quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Scanning {kind}"));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    spinner
}
