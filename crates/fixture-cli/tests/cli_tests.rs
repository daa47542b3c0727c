//! Integration tests for the `fixture` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to drive the extract, batch,
//! and tokens subcommands through the actual binary, covering stdout and file
//! output, exit statuses, and the batch report format.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

/// Helper: path to the player update fixture (a `Body = new ...` test).
fn player_update_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/PlayerUpdateTest.cs")
}

/// Helper: path to a fixture whose construction has no braces.
fn empty_request_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/EmptyRequestTest.cs")
}

/// Helper: path to a fixture with an unterminated block comment.
fn broken_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/Broken.cs")
}

const PLAYER_UPDATE_JSON: &str = concat!(
    r#"{"PlayerId":4242,"DisplayName":"Ren","Level":17,"Ratio":0.75,"#,
    r#""Friends":[1001,1002],"Settings":{"sound":"True","vibration":"False"},"#,
    r#""Avatar":{"FrameId":3,"Colors":["red","blue"]}}"#
);

fn fixture() -> Command {
    Command::cargo_bin("fixture").unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Extract subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn extract_compact_to_stdout() {
    fixture()
        .args(["extract", player_update_path(), "--compact"])
        .assert()
        .success()
        .stdout(format!("{PLAYER_UPDATE_JSON}\n"));
}

#[test]
fn extract_indented_by_default() {
    fixture()
        .args(["extract", player_update_path()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\n  \"PlayerId\": 4242,\n"))
        .stdout(predicate::str::contains("\"Friends\": [\n    1001,\n    1002\n  ]"));
}

#[test]
fn extract_by_type() {
    fixture()
        .args([
            "extract",
            player_update_path(),
            "--identifier",
            "AvatarInfo",
            "--by-type",
            "--compact",
        ])
        .assert()
        .success()
        .stdout(r#"{"FrameId":3,"Colors":["red","blue"]}"#.to_string() + "\n");
}

#[test]
fn extract_to_file() {
    let output_path = std::env::temp_dir().join("fixture-cli-test-extract.json");
    let _ = std::fs::remove_file(&output_path);

    fixture()
        .args(["extract", player_update_path(), "--compact", "-o"])
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(&output_path).expect("output file must exist");
    assert_eq!(content, PLAYER_UPDATE_JSON);

    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn extract_no_match_exits_with_two() {
    fixture()
        .args(["extract", player_update_path(), "--identifier", "Payload"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No assignment to 'Payload'"));
}

#[test]
fn extract_no_match_by_type_names_the_mode() {
    fixture()
        .args(["extract", player_update_path(), "--identifier", "Missing", "--by-type"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No construction of type 'Missing'"));
}

#[test]
fn extract_without_initializer_prints_nothing() {
    fixture()
        .args(["extract", empty_request_path()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn extract_missing_file_fails() {
    fixture()
        .args(["extract", "/nonexistent/Nope.cs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/Nope.cs"));
}

#[test]
fn extract_syntax_error_reports_position() {
    fixture()
        .args(["extract", broken_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3, column 5"))
        .stderr(predicate::str::contains("unterminated block comment"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Batch subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn batch_reports_every_file() {
    let output = fixture()
        .args(["batch", player_update_path(), empty_request_path(), "--compact"])
        .output()
        .expect("batch should run");
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).expect("report is JSON");
    let entries = report.as_array().expect("report is an array");
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0]["path"], player_update_path());
    assert_eq!(entries[0]["status"], "extracted");
    assert_eq!(
        entries[0]["body"],
        serde_json::from_str::<Value>(PLAYER_UPDATE_JSON).unwrap()
    );

    assert_eq!(entries[1]["status"], "no_initializer");
    assert_eq!(entries[1]["body"], Value::Null);
}

#[test]
fn batch_keeps_key_order_of_bodies() {
    fixture()
        .args(["batch", player_update_path(), "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(r#""body":{PLAYER_UPDATE_JSON}"#)));
}

#[test]
fn batch_continues_past_failures() {
    let output = fixture()
        .args([
            "batch",
            "/nonexistent/Nope.cs",
            broken_path(),
            player_update_path(),
        ])
        .output()
        .expect("batch should run");
    assert!(!output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).expect("report is JSON");
    let statuses: Vec<&str> = report
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["error", "error", "extracted"]);
    assert!(report[0]["body"]
        .as_str()
        .unwrap()
        .contains("/nonexistent/Nope.cs"));
}

#[test]
fn batch_no_match_is_not_a_failure() {
    fixture()
        .args(["batch", player_update_path(), "--identifier", "Payload"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"no_match\""));
}

#[test]
fn batch_requires_a_file() {
    fixture().arg("batch").assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokens subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn tokens_lists_positions_and_kinds() {
    fixture()
        .args(["tokens", empty_request_path()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1:1\tident\tpublic\n"))
        .stdout(predicate::str::contains("5:9\tident\tBody\n"))
        .stdout(predicate::str::contains("5:14\tpunct\t=\n"));
}

#[test]
fn tokens_fails_on_unterminated_comment() {
    fixture()
        .args(["tokens", broken_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unterminated block comment"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging and help
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn verbose_logs_go_to_stderr() {
    fixture()
        .args(["-vv", "extract", player_update_path(), "--compact"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout(format!("{PLAYER_UPDATE_JSON}\n"))
        .stderr(predicate::str::contains("resolved initializer"));
}

#[test]
fn no_subcommand_shows_usage() {
    fixture()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
