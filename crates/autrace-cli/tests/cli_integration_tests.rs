//! CLI integration tests
//!
//! Run the `autrace` binary against transaction files and check the JSON it
//! prints.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;

fn write_json(dir: &TempDir, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn run(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_autrace"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn before_tx() -> serde_json::Value {
    json!({
        "accountUpdates": [
            {"id": "fee", "label": "Fee payer", "body": {"publicKey": "B62qpayer", "balanceChange": "-1000000000"}},
            {"id": "zk", "label": "Token.mint()", "body": {"publicKey": "B62qzk", "update": {"appState": ["0"]}}}
        ]
    })
}

fn after_tx() -> serde_json::Value {
    json!({
        "accountUpdates": [
            {"id": "fee", "label": "Fee payer", "body": {"publicKey": "B62qpayer", "balanceChange": "-1000000000"}},
            {"id": "zk", "label": "Token.mint()", "body": {"publicKey": "B62qzk", "update": {"appState": ["9"]}}},
            {"id": "recv", "label": "Receiver", "callDepth": 1, "body": {"publicKey": "B62qrecv"}}
        ]
    })
}

#[test]
fn test_cli_analyze_prints_state() {
    let dir = TempDir::new().unwrap();
    let file = write_json(&dir, "tx.json", &after_tx());

    let output = run(&["analyze", file.to_str().unwrap()], dir.path());
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let state = stdout_json(&output);
    assert_eq!(state["summary"]["accountUpdates"], 3);
    assert_eq!(state["relationships"][2]["parentId"], "zk");
    assert_eq!(state["flow"]["nodes"].as_array().unwrap().len(), 3);
}

#[test]
fn test_cli_diff_reports_changes_between_files() {
    let dir = TempDir::new().unwrap();
    let before = write_json(&dir, "before.json", &before_tx());
    let after = write_json(&dir, "after.json", &after_tx());

    let output = run(
        &["diff", before.to_str().unwrap(), after.to_str().unwrap()],
        dir.path(),
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let log = stdout_json(&output);
    assert_eq!(log["added"][0]["path"], "accountUpdate[2]");
    assert_eq!(log["updated"][0]["path"], "accountUpdate[1].body.update.appState");
    assert!(log["removed"].as_array().unwrap().is_empty());
}

#[test]
fn test_cli_flow_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let file = write_json(&dir, "tx.json", &after_tx());
    let out = dir.path().join("flow.json");

    let output = run(
        &["flow", file.to_str().unwrap(), "--output", out.to_str().unwrap()],
        dir.path(),
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let graph: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let edges = graph["edges"].as_array().unwrap();
    assert!(edges
        .iter()
        .any(|e| e["from"] == "au-0" && e["to"] == "au-1" && e["type"] == "fee_payer"));
}

#[test]
fn test_cli_rejects_unknown_phase() {
    let dir = TempDir::new().unwrap();
    let before = write_json(&dir, "before.json", &before_tx());
    let after = write_json(&dir, "after.json", &after_tx());

    let output = run(
        &[
            "diff",
            before.to_str().unwrap(),
            after.to_str().unwrap(),
            "--after-phase",
            "mint",
        ],
        dir.path(),
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: [ERR_UNKNOWN_PHASE]"), "stderr: {}", stderr);
}

#[test]
fn test_cli_rejects_non_object_payload() {
    let dir = TempDir::new().unwrap();
    let file = write_json(&dir, "list.json", &json!([1, 2, 3]));

    let output = run(&["analyze", file.to_str().unwrap()], dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_INVALID_TRANSACTION"));
}

#[test]
fn test_cli_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let output = run(&["flow", "does-not-exist.json"], dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_IO"));
}

#[test]
fn test_cli_applies_config_file() {
    let dir = TempDir::new().unwrap();
    let file = write_json(&dir, "tx.json", &after_tx());
    let before = write_json(&dir, "before.json", &before_tx());
    let config = dir.path().join("autrace.toml");
    fs::write(&config, "path_root = \"au\"\n").unwrap();

    let output = run(
        &[
            "--config",
            config.to_str().unwrap(),
            "diff",
            before.to_str().unwrap(),
            file.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output)["added"][0]["path"], "au[2]");
}
