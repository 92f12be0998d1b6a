//! Weekday × hour activity counts and their per-weekday z-scores.

use std::path::Path;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, SmError};
use crate::twitter::parse_twitter_time;

pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const HOURS: usize = 24;

/// Read user dump files (JSON arrays) and collect each user's last status time.
///
/// Users that never tweeted, or whose timestamp cannot be parsed, are skipped.
pub fn load_status_times<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<DateTime<Utc>>> {
    if paths.is_empty() {
        return Err(SmError::Heatmap("no user data files given".to_string()));
    }
    info!("Loaded {} user data files", paths.len());

    let mut users = Vec::new();
    for path in paths {
        let path = path.as_ref();
        info!("Processing {}...", path.display());
        let raw = std::fs::read_to_string(path)?;
        let parsed: Value = serde_json::from_str(&raw)?;
        match parsed {
            Value::Array(entries) => users.extend(entries),
            _ => {
                return Err(SmError::Heatmap(format!(
                    "{} is not a JSON array of users",
                    path.display()
                )));
            }
        }
    }
    info!("Loaded {} users", users.len());

    let times: Vec<DateTime<Utc>> = users
        .iter()
        .filter_map(|user| user.pointer("/status/created_at").and_then(Value::as_str))
        .filter_map(|raw| {
            let parsed = parse_twitter_time(raw);
            if parsed.is_none() {
                debug!(raw, "skipping unparseable status time");
            }
            parsed
        })
        .collect();
    info!("Extracted {} status updates", times.len());
    Ok(times)
}

/// Post counts indexed by `[hour][weekday]`, Monday first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityGrid {
    counts: [[u32; 7]; HOURS],
}

impl ActivityGrid {
    pub fn from_times(times: &[DateTime<Utc>], offset: FixedOffset) -> Self {
        let mut counts = [[0u32; 7]; HOURS];
        for ts in times {
            let local = ts.with_timezone(&offset);
            let weekday = local.weekday().num_days_from_monday() as usize;
            let hour = local.hour() as usize;
            counts[hour][weekday] += 1;
        }
        Self { counts }
    }

    pub fn count(&self, hour: usize, weekday: usize) -> u32 {
        self.counts[hour][weekday]
    }

    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .flatten()
            .map(|&count| u64::from(count))
            .sum()
    }

    fn weekday_total(&self, weekday: usize) -> u64 {
        self.counts.iter().map(|row| u64::from(row[weekday])).sum()
    }

    /// Standardize each weekday column (sample standard deviation).
    ///
    /// A column without variance maps to all zeros.
    pub fn standardize(&self) -> Heatmap {
        let mut scores = [[0f64; 7]; HOURS];
        for weekday in 0..7 {
            let column: Vec<f64> = self
                .counts
                .iter()
                .map(|row| f64::from(row[weekday]))
                .collect();
            let n = column.len() as f64;
            let mean = column.iter().sum::<f64>() / n;
            let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            let std = variance.sqrt();
            if std == 0.0 {
                continue;
            }
            for (hour, value) in column.iter().enumerate() {
                scores[hour][weekday] = (value - mean) / std;
            }
        }

        let active = (0..7).map(|weekday| self.weekday_total(weekday) > 0).collect();
        Heatmap { scores, active }
    }
}

/// Z-scored activity, indexed by `[hour][weekday]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    scores: [[f64; 7]; HOURS],
    active: Vec<bool>,
}

impl Heatmap {
    pub fn score(&self, hour: usize, weekday: usize) -> f64 {
        self.scores[hour][weekday]
    }

    pub fn hours(&self) -> usize {
        HOURS
    }

    /// `(min, max)` over all cells.
    pub fn range(&self) -> (f64, f64) {
        self.scores
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Most active hour for each weekday that saw any activity.
    pub fn most_active_hours(&self) -> Vec<(&'static str, usize)> {
        (0..7)
            .filter(|&weekday| self.active[weekday])
            .map(|weekday| {
                let mut best = 0;
                for hour in 1..HOURS {
                    if self.scores[hour][weekday] > self.scores[best][weekday] {
                        best = hour;
                    }
                }
                (WEEKDAYS[weekday], best)
            })
            .collect()
    }
}
