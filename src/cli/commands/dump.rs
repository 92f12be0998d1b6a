//! smcron dump-connections - Export friends or followers to a JSON file

use std::ops::ControlFlow;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, RobotStatus, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::remote::ResourceKind;
use crate::twitter::types::DumpedUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConnectionKind {
    Friends,
    Followers,
}

impl From<ConnectionKind> for ResourceKind {
    fn from(kind: ConnectionKind) -> Self {
        match kind {
            ConnectionKind::Friends => Self::Connections,
            ConnectionKind::Followers => Self::Followers,
        }
    }
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Which connection list to export
    #[arg(long, value_enum, default_value = "friends")]
    pub kind: ConnectionKind,

    /// Destination file (defaults to <kind>.json)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct DumpOutput {
    kind: ResourceKind,
    path: PathBuf,
    users: usize,
}

pub fn run(ctx: &AppContext, args: &DumpArgs) -> Result<()> {
    let kind = ResourceKind::from(args.kind);
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.json", kind.noun())));

    let mut engine = super::connect(ctx, kind)?;
    info!("Fetching {kind}...");
    let spinner = super::scanning_spinner(ctx, kind);
    let mut users = Vec::new();
    let result = engine.scan(kind, |_, item| {
        users.push(DumpedUser::from(&item));
        Ok(ControlFlow::Continue(()))
    });
    spinner.finish_and_clear();
    let summary = result?;

    write_dump(&path, &users)?;
    info!(users = users.len(), path = %path.display(), "Wrote {kind}");

    let output = DumpOutput {
        kind,
        path,
        users: users.len(),
    };
    if ctx.robot_mode {
        let mut response = robot_ok(&output);
        if let Some(reason) = summary.halted {
            response.status = RobotStatus::Partial {
                completed: summary.scanned,
                failed: 0,
            };
            response.warnings.push(reason);
        }
        return emit_robot(&response);
    }

    let mut layout = HumanLayout::new();
    layout
        .title(&format!("Dumped {kind}"))
        .kv("Users", &output.users.to_string())
        .kv("File", &output.path.display().to_string());
    if let Some(reason) = summary.halted {
        layout.blank().section("Stopped early").bullet(&reason);
    }
    emit_human(layout);
    Ok(())
}

fn write_dump(path: &std::path::Path, users: &[DumpedUser]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(users)?;
    std::fs::write(path, json)?;
    Ok(())
}
