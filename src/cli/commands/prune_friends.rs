//! smcron prune-friends - Unfollow inactive friends

use clap::Args;

use crate::app::AppContext;
use crate::error::Result;
use crate::prune::PrunePolicy;
use crate::remote::ResourceKind;

#[derive(Args, Debug)]
pub struct PruneFriendsArgs {
    /// Maximum days since a friend's last tweet (defaults to twitter.friend_prune_days)
    #[arg(long)]
    pub days: Option<u32>,

    /// Dry run - report who would be unfollowed
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(ctx: &AppContext, args: &PruneFriendsArgs) -> Result<()> {
    let days = args.days.unwrap_or(ctx.config.twitter.friend_prune_days);
    super::run_prune(
        ctx,
        ResourceKind::Connections,
        PrunePolicy::for_connections(days),
        args.dry_run,
    )?;
    Ok(())
}
