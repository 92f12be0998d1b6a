use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;

use crate::error::{Result, SmError};
use crate::prune::{PruneReport, RunOutcome};

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    Error { code: String, message: String },
    Partial { completed: u64, failed: u64 },
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
        warnings: Vec::new(),
    }
}

pub fn robot_error(
    code: impl Into<String>,
    message: impl Into<String>,
) -> RobotResponse<serde_json::Value> {
    RobotResponse {
        status: RobotStatus::Error {
            code: code.into(),
            message: message.into(),
        },
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data: serde_json::Value::Null,
        warnings: Vec::new(),
    }
}

/// Robot envelope for a prune run; halted runs are reported as partial.
pub fn robot_report(report: &PruneReport) -> RobotResponse<&PruneReport> {
    let mut response = robot_ok(report);
    if let RunOutcome::Halted { reason } = &report.outcome {
        response.status = RobotStatus::Partial {
            completed: report.scanned,
            failed: report.failed,
        };
        response.warnings.push(reason.clone());
    }
    response
}

pub fn emit_robot<T: Serialize>(response: &RobotResponse<T>) -> Result<()> {
    emit_json(response)
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| SmError::Config(format!("serialize output: {err}")))?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 18,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let key_style = style(key).dim().to_string();
        self.lines.push(format!(
            "{key_style:width$} {value}",
            width = self.key_width
        ));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

pub fn report_layout(report: &PruneReport) -> HumanLayout {
    let mut layout = HumanLayout::new();
    let title = if report.dry_run {
        format!("Prune {} (dry run)", report.kind)
    } else {
        format!("Prune {}", report.kind)
    };
    layout
        .title(&title)
        .kv("Reference date", &report.reference_date.to_string())
        .kv("Max age (days)", &report.policy.max_age_days.to_string())
        .kv("Scanned", &report.scanned.to_string())
        .kv("Stale", &report.stale.to_string())
        .kv("Deleted", &report.deleted.to_string())
        .kv("Failed", &report.failed.to_string())
        .kv("Rate-limit pauses", &report.pauses.to_string());
    if let RunOutcome::Halted { reason } = &report.outcome {
        layout
            .blank()
            .section("Stopped early")
            .bullet(reason);
    }
    layout
}
