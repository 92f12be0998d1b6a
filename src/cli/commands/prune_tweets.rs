//! smcron prune-tweets - Delete own tweets past their age limit

use clap::Args;

use crate::app::AppContext;
use crate::error::Result;
use crate::prune::PrunePolicy;
use crate::remote::ResourceKind;

#[derive(Args, Debug)]
pub struct PruneTweetsArgs {
    /// Maximum tweet age in days (defaults to twitter.tweet_prune_days)
    #[arg(long)]
    pub days: Option<u32>,

    /// Delete liked tweets too
    #[arg(long)]
    pub delete_liked: bool,

    /// Dry run - report what would be deleted
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(ctx: &AppContext, args: &PruneTweetsArgs) -> Result<()> {
    let policy = policy(ctx, args);
    super::run_prune(ctx, ResourceKind::Posts, policy, args.dry_run)?;
    Ok(())
}

fn policy(ctx: &AppContext, args: &PruneTweetsArgs) -> PrunePolicy {
    let twitter = &ctx.config.twitter;
    PrunePolicy::for_posts(
        args.days.unwrap_or(twitter.tweet_prune_days),
        args.delete_liked || twitter.is_delete_liked,
    )
}
