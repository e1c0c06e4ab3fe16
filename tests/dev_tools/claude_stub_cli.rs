//! Integration tests for the claude-stub binary.
//!
//! Gated behind the `dev-tools` feature; run with
//! `cargo test --features dev-tools --test claude_stub_cli`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn claude_stub_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("claude-stub").unwrap();
    cmd.current_dir(dir).arg("-p").arg("do the thing");
    cmd
}

#[test]
fn success_scenario_writes_done_status() {
    let dir = tempfile::tempdir().unwrap();
    claude_stub_cmd(dir.path())
        .env("RALPH_STUB_SCENARIO", "success")
        .assert()
        .success()
        .stdout(predicate::str::contains("Verified"));

    let status = fs::read_to_string(dir.path().join(".ralph/status")).unwrap();
    assert_eq!(status.trim(), "DONE");
}

#[test]
fn continue_scenario_writes_continue_status() {
    let dir = tempfile::tempdir().unwrap();
    claude_stub_cmd(dir.path())
        .env("RALPH_STUB_SCENARIO", "continue")
        .assert()
        .success();

    let status = fs::read_to_string(dir.path().join(".ralph/status")).unwrap();
    assert_eq!(status.trim(), "CONTINUE");
}

#[test]
fn crash_scenario_exits_nonzero_without_status() {
    let dir = tempfile::tempdir().unwrap();
    claude_stub_cmd(dir.path())
        .env("RALPH_STUB_SCENARIO", "crash")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("simulated crash"));

    assert!(!dir.path().join(".ralph/status").exists());
}

#[test]
fn exhausted_scenario_emits_usage_limit_marker() {
    let dir = tempfile::tempdir().unwrap();
    claude_stub_cmd(dir.path())
        .env("RALPH_STUB_SCENARIO", "exhausted")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Claude AI usage limit reached|"));
}
