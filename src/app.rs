use chrono::{Local, NaiveDate};

use crate::cli::Cli;
use crate::config::Config;

pub struct AppContext {
    pub config: Config,
    pub robot_mode: bool,
    pub quiet: bool,
    /// Reference date for every age comparison made by this process.
    pub today: NaiveDate,
}

impl AppContext {
    pub fn with_config(cli: &Cli, config: Config) -> Self {
        Self {
            config,
            robot_mode: cli.robot,
            quiet: cli.quiet,
            today: Local::now().date_naive(),
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(config: Config) -> Self {
        Self {
            config,
            robot_mode: true,
            quiet: true,
            today: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
        }
    }
}
