//! E2E Scenario: dump followers, then plot them

use httpmock::prelude::*;
use serde_json::{Value, json};
use tempfile::tempdir;

use super::common::{API_PREFIX, mock_verify_credentials, smcron, stdout_json, write_config};

#[test]
fn followers_dump_feeds_the_heatmap() {
    let server = MockServer::start();
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(API_PREFIX));

    mock_verify_credentials(&server);
    let first = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{API_PREFIX}/followers/list.json"))
            .query_param("cursor", "-1");
        then.status(200).json_body(json!({
            "users": [
                {"id_str": "1", "screen_name": "early_bird", "status": {"created_at": "Mon Jun 03 06:15:00 +0000 2024"}},
                {"id_str": "2", "screen_name": "quiet"}
            ],
            "next_cursor_str": "777"
        }));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{API_PREFIX}/followers/list.json"))
            .query_param("cursor", "777");
        then.status(200).json_body(json!({
            "users": [
                {"id_str": "3", "screen_name": "night_owl", "status": {"created_at": "Sat Jun 08 23:40:00 +0000 2024"}}
            ],
            "next_cursor_str": "0"
        }));
    });

    let dump_path = dir.path().join("dumps/followers.json");
    let output = smcron(&config)
        .args(["--robot", "dump-connections", "--kind", "followers", "--output"])
        .arg(&dump_path)
        .output()
        .unwrap();
    assert!(output.status.success());
    first.assert();
    second.assert();
    assert_eq!(stdout_json(&output)["data"]["users"], 3);

    let dumped: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(&dump_path).unwrap()).unwrap();
    assert_eq!(dumped.len(), 3);
    assert_eq!(dumped[0]["screen_name"], "early_bird");
    assert_eq!(
        dumped[0]["status"]["created_at"],
        "Mon Jun 03 06:15:00 +0000 2024"
    );
    assert!(dumped[1].get("status").is_none());

    let svg_path = dir.path().join("heatmap.svg");
    let output = smcron(&config)
        .args(["--robot", "twitter-heatmap", "--output"])
        .arg(&svg_path)
        .arg(&dump_path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["data"]["statuses"], 2);
    assert!(std::fs::read_to_string(&svg_path).unwrap().contains("Twitter Heatmap"));
}
