//! E2E Scenario: heatmap from checked-in user dumps

use std::path::PathBuf;

use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

use super::common::{smcron, stdout_json, write_empty_config};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/dumps")
        .join(name)
}

#[test]
fn merges_dump_files_and_reports_peaks() {
    let dir = tempdir().unwrap();
    let config = write_empty_config(dir.path());
    let svg = dir.path().join("out/heatmap.svg");

    let output = smcron(&config)
        .args(["--robot", "twitter-heatmap", "--output"])
        .arg(&svg)
        .arg(fixture("friends.json"))
        .arg(fixture("followers.json"))
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = stdout_json(&output);
    let data = &json["data"];
    // one user in friends.json never tweeted
    assert_eq!(data["statuses"], 5);
    let peaks: Vec<(String, u64)> = data["most_active"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["weekday"].as_str().unwrap().to_string(), p["hour"].as_u64().unwrap()))
        .collect();
    assert_eq!(
        peaks,
        vec![
            ("Mon".to_string(), 9),
            ("Wed".to_string(), 18),
            ("Sat".to_string(), 22)
        ]
    );

    let rendered = std::fs::read_to_string(&svg).unwrap();
    assert!(rendered.starts_with("<svg"));
    assert_eq!(rendered.matches("<rect x=").count(), 24 * 7);
}

#[test]
fn utc_offset_shifts_buckets() {
    let dir = tempdir().unwrap();
    let config = write_empty_config(dir.path());
    let svg = dir.path().join("heatmap.svg");

    let output = smcron(&config)
        .args(["--robot", "twitter-heatmap", "--utc-offset", "-05:00", "--output"])
        .arg(&svg)
        .arg(fixture("followers.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let peaks = &stdout_json(&output)["data"]["most_active"];
    // Wed 18:xx UTC and Sat 22:xx UTC, five hours earlier
    assert_eq!(peaks[0]["weekday"], Value::from("Wed"));
    assert_eq!(peaks[0]["hour"], 13);
    assert_eq!(peaks[1]["weekday"], Value::from("Sat"));
    assert_eq!(peaks[1]["hour"], 17);
}

#[test]
fn invalid_offset_is_config_error() {
    let dir = tempdir().unwrap();
    let config = write_empty_config(dir.path());

    smcron(&config)
        .args(["twitter-heatmap", "--utc-offset", "eastern"])
        .arg(fixture("followers.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("utc_offset"));
}

#[test]
fn dump_without_any_status_is_rejected() {
    let dir = tempdir().unwrap();
    let config = write_empty_config(dir.path());
    let empty = dir.path().join("silent.json");
    std::fs::write(&empty, r#"[{"id": "1", "screen_name": "silent"}]"#).unwrap();

    let output = smcron(&config)
        .args(["--robot", "twitter-heatmap"])
        .arg(&empty)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(stdout_json(&output)["code"], "heatmap");
}
