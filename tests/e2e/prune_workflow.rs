//! E2E Scenario: Prune Workflow
//!
//! - Friends prune unfollows stale and never-active friends only
//! - Dry run reports the same stale count without deleting
//! - Hard quota ends the run early with a partial report and exit 0
//! - Rejected credentials fail the run
//! - Tweet prune walks timeline pages by max_id and keeps self-liked tweets
//!   unless --delete-liked is given

use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;

use super::common::{
    API_PREFIX, days_ago, mock_verify_credentials, smcron, stdout_json, write_config,
};

fn mock_friends(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("{API_PREFIX}/friends/list.json"))
            .query_param("cursor", "-1");
        then.status(200).json_body(json!({
            "users": [
                {"id_str": "101", "screen_name": "dormant", "status": {"created_at": days_ago(400)}},
                {"id_str": "102", "screen_name": "chatty", "status": {"created_at": days_ago(2)}},
                {"id_str": "103", "screen_name": "lurker"}
            ],
            "next_cursor_str": "0"
        }));
    })
}

fn mock_unfollow<'a>(server: &'a MockServer, user_id: &str) -> httpmock::Mock<'a> {
    server.mock(|when, then| {
        when.method(POST)
            .path(format!("{API_PREFIX}/friendships/destroy.json"))
            .query_param("user_id", user_id);
        then.status(200)
            .json_body(json!({"id_str": user_id, "screen_name": "gone"}));
    })
}

#[test]
fn prune_friends_unfollows_stale_and_silent_friends() {
    let server = MockServer::start();
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(API_PREFIX));

    let verify = mock_verify_credentials(&server);
    let friends = mock_friends(&server);
    let dormant = mock_unfollow(&server, "101");
    let lurker = mock_unfollow(&server, "103");

    let output = smcron(&config)
        .args(["--robot", "prune-friends", "--days", "365"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    verify.assert();
    friends.assert();
    dormant.assert();
    lurker.assert();

    let json = stdout_json(&output);
    assert_eq!(json["status"], "ok");
    let report = &json["data"];
    assert_eq!(report["kind"], "connections");
    assert_eq!(report["dry_run"], false);
    assert_eq!(report["scanned"], 3);
    assert_eq!(report["stale"], 2);
    assert_eq!(report["deleted"], 2);
    assert_eq!(report["failed"], 0);
    assert_eq!(report["outcome"]["status"], "completed");
}

#[test]
fn dry_run_counts_without_unfollowing() {
    let server = MockServer::start();
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(API_PREFIX));

    mock_verify_credentials(&server);
    mock_friends(&server);

    let output = smcron(&config)
        .args(["--robot", "prune-friends", "--days", "365", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = &stdout_json(&output)["data"];
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["stale"], 2);
    assert_eq!(report["deleted"], 0);
}

#[test]
fn failed_unfollow_is_counted_and_run_continues() {
    let server = MockServer::start();
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(API_PREFIX));

    mock_verify_credentials(&server);
    mock_friends(&server);
    server.mock(|when, then| {
        when.method(POST)
            .path(format!("{API_PREFIX}/friendships/destroy.json"))
            .query_param("user_id", "101");
        then.status(404)
            .json_body(json!({"errors": [{"code": 108, "message": "Cannot find specified user."}]}));
    });
    let lurker = mock_unfollow(&server, "103");

    let output = smcron(&config)
        .args(["--robot", "prune-friends", "--days", "365"])
        .output()
        .unwrap();
    assert!(output.status.success());
    lurker.assert();

    let report = &stdout_json(&output)["data"];
    assert_eq!(report["deleted"], 1);
    assert_eq!(report["failed"], 1);
}

#[test]
fn hard_quota_ends_tweet_prune_with_partial_report() {
    let server = MockServer::start();
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(API_PREFIX));

    mock_verify_credentials(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("{API_PREFIX}/statuses/user_timeline.json"));
        then.status(429).json_body(json!({
            "title": "UsageCapExceeded",
            "detail": "Usage cap exceeded: Monthly product cap"
        }));
    });

    let output = smcron(&config)
        .args(["--robot", "prune-tweets"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["status"]["partial"]["completed"], 0);
    assert_eq!(json["data"]["outcome"]["status"], "halted");
    assert_eq!(json["data"]["scanned"], 0);
}

#[test]
fn rejected_credentials_fail_the_run() {
    let server = MockServer::start();
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(API_PREFIX));

    server.mock(|when, then| {
        when.method(GET)
            .path(format!("{API_PREFIX}/account/verify_credentials.json"));
        then.status(401)
            .json_body(json!({"errors": [{"code": 32, "message": "Could not authenticate you."}]}));
    });

    let output = smcron(&config)
        .args(["--robot", "prune-friends"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["code"], "authentication");
}

#[test]
fn human_summary_lists_counts() {
    let server = MockServer::start();
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(API_PREFIX));

    mock_verify_credentials(&server);
    mock_friends(&server);

    smcron(&config)
        .args(["prune-friends", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Prune friends (dry run)"))
        .stdout(predicate::str::contains("Stale"))
        .stderr(predicate::str::contains("Authenticated as owner with 321 tweets"));
}

fn mock_timeline(server: &MockServer) -> Vec<httpmock::Mock<'_>> {
    let first = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{API_PREFIX}/statuses/user_timeline.json"))
            .query_param("tweet_mode", "extended")
            .query_param_missing("max_id");
        then.status(200).json_body(json!([
            {"id_str": "300", "created_at": days_ago(400), "full_text": "pinned thread", "favorited": true},
            {"id_str": "250", "created_at": days_ago(500), "full_text": "old news"},
            {"id_str": "200", "created_at": days_ago(3), "full_text": "this week"}
        ]));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{API_PREFIX}/statuses/user_timeline.json"))
            .query_param("max_id", "199");
        then.status(200).json_body(json!([
            {"id_str": "150", "created_at": days_ago(700), "full_text": "ancient"}
        ]));
    });
    let last = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{API_PREFIX}/statuses/user_timeline.json"))
            .query_param("max_id", "149");
        then.status(200).json_body(json!([]));
    });
    vec![first, second, last]
}

fn mock_destroy<'a>(server: &'a MockServer, id: &str) -> httpmock::Mock<'a> {
    server.mock(|when, then| {
        when.method(POST)
            .path(format!("{API_PREFIX}/statuses/destroy/{id}.json"));
        then.status(200).json_body(json!({"id_str": id}));
    })
}

#[test]
fn prune_tweets_walks_timeline_and_keeps_liked() {
    let server = MockServer::start();
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(API_PREFIX));

    mock_verify_credentials(&server);
    let pages = mock_timeline(&server);
    let liked = mock_destroy(&server, "300");
    let old = mock_destroy(&server, "250");
    let fresh = mock_destroy(&server, "200");
    let ancient = mock_destroy(&server, "150");

    let output = smcron(&config)
        .args(["--robot", "prune-tweets", "--days", "365"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    for page in &pages {
        page.assert();
    }
    old.assert();
    ancient.assert();
    liked.assert_calls(0);
    fresh.assert_calls(0);

    let report = &stdout_json(&output)["data"];
    assert_eq!(report["kind"], "posts");
    assert_eq!(report["policy"]["exempt_if_flag_set"], true);
    assert_eq!(report["scanned"], 4);
    assert_eq!(report["stale"], 2);
    assert_eq!(report["deleted"], 2);
}

#[test]
fn delete_liked_flag_removes_liked_tweets() {
    let server = MockServer::start();
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(API_PREFIX));

    mock_verify_credentials(&server);
    mock_timeline(&server);
    let liked = mock_destroy(&server, "300");
    let old = mock_destroy(&server, "250");
    let fresh = mock_destroy(&server, "200");
    let ancient = mock_destroy(&server, "150");

    let output = smcron(&config)
        .args(["--robot", "prune-tweets", "--days", "365", "--delete-liked"])
        .output()
        .unwrap();
    assert!(output.status.success());

    liked.assert();
    old.assert();
    ancient.assert();
    fresh.assert_calls(0);

    let report = &stdout_json(&output)["data"];
    assert_eq!(report["stale"], 3);
    assert_eq!(report["deleted"], 3);
}
