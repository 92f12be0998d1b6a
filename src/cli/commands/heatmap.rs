//! smcron twitter-heatmap - Plot when dumped users last tweeted

use std::path::PathBuf;

use chrono::Local;
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::{Result, SmError};
use crate::plot::{ActivityGrid, load_status_times, render_svg};

const TITLE: &str = "Twitter Heatmap";

#[derive(Args, Debug)]
pub struct HeatmapArgs {
    /// User dump files written by dump-connections
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// SVG destination (defaults to plot.output)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// UTC offset for bucketing, e.g. -05:00 (defaults to plot.utc_offset)
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<String>,
}

#[derive(Debug, Serialize)]
struct PeakHour {
    weekday: &'static str,
    hour: usize,
}

#[derive(Debug, Serialize)]
struct HeatmapOutput {
    path: PathBuf,
    statuses: usize,
    most_active: Vec<PeakHour>,
}

pub fn run(ctx: &AppContext, args: &HeatmapArgs) -> Result<()> {
    let mut plot = ctx.config.plot.clone();
    if let Some(offset) = &args.utc_offset {
        plot.utc_offset.clone_from(offset);
    }
    let offset = plot.offset()?;
    let path = args.output.clone().unwrap_or(plot.output);

    let times = load_status_times(args.files.as_slice())?;
    if times.is_empty() {
        return Err(SmError::Heatmap(
            "no status timestamps found in the given files".to_string(),
        ));
    }

    let heatmap = ActivityGrid::from_times(&times, offset).standardize();
    let most_active: Vec<PeakHour> = heatmap
        .most_active_hours()
        .into_iter()
        .map(|(weekday, hour)| {
            info!("Most active hour on {weekday}: {hour:02}:00");
            PeakHour { weekday, hour }
        })
        .collect();

    let subtitle = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let svg = render_svg(&heatmap, TITLE, &subtitle);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, svg)?;
    info!("Saved heatmap to {}", path.display());

    let output = HeatmapOutput {
        path,
        statuses: times.len(),
        most_active,
    };
    if ctx.robot_mode {
        return emit_robot(&robot_ok(&output));
    }

    let mut layout = HumanLayout::new();
    layout
        .title(TITLE)
        .kv("Statuses", &output.statuses.to_string())
        .kv("UTC offset", &plot.utc_offset)
        .kv("Saved to", &output.path.display().to_string())
        .blank()
        .section("Most active hours");
    for peak in &output.most_active {
        layout.bullet(&format!("{} {:02}:00", peak.weekday, peak.hour));
    }
    emit_human(layout);
    Ok(())
}
