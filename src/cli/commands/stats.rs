//! smcron log-stats - Log account counters

use clap::Args;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::remote::CredentialProvider;
use crate::twitter::TwitterProvider;

#[derive(Args, Debug)]
pub struct StatsArgs {}

pub fn run(ctx: &AppContext, _args: &StatsArgs) -> Result<()> {
    let provider = TwitterProvider::new(ctx.config.twitter.clone());
    let (_client, account) = provider.authenticate()?;

    info!(
        followers = account.followers_count,
        friends = account.friends_count,
        listed = account.listed_count,
        verified = account.verified,
        "Account stats for {}",
        account.screen_name
    );

    if ctx.robot_mode {
        return emit_robot(&robot_ok(&account));
    }

    let mut layout = HumanLayout::new();
    layout
        .title(&format!("@{}", account.screen_name))
        .kv("Tweets", &account.statuses_count.to_string())
        .kv("Followers", &account.followers_count.to_string())
        .kv("Friends", &account.friends_count.to_string())
        .kv("Listed", &account.listed_count.to_string())
        .kv("Verified", if account.verified { "yes" } else { "no" });
    emit_human(layout);
    Ok(())
}
