//! Integration tests for the codex-stub binary.
//!
//! Gated behind the `dev-tools` feature; run with
//! `cargo test --features dev-tools --test codex_stub_cli`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn codex_stub_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("codex-stub").unwrap();
    cmd.current_dir(dir)
        .args(["exec", "-C"])
        .arg(dir)
        .args(["--skip-git-repo-check", "--dangerously-bypass-approvals-and-sandbox", "do the thing"]);
    cmd
}

#[test]
fn success_scenario_writes_done_status() {
    let dir = tempfile::tempdir().unwrap();
    codex_stub_cmd(dir.path())
        .env("RALPH_STUB_SCENARIO", "success")
        .assert()
        .success();

    let status = fs::read_to_string(dir.path().join(".ralph/status")).unwrap();
    assert_eq!(status.trim(), "DONE");
}

#[test]
fn crash_scenario_reports_generic_runtime_error() {
    let dir = tempfile::tempdir().unwrap();
    codex_stub_cmd(dir.path())
        .env("RALPH_STUB_SCENARIO", "crash")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unexpected internal failure"));
}

#[test]
fn exhausted_scenario_reports_usage_limit_in_runtime_region() {
    let dir = tempfile::tempdir().unwrap();
    codex_stub_cmd(dir.path())
        .env("RALPH_STUB_SCENARIO", "exhausted")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("usage_limit_reached"))
        .stderr(predicate::str::contains("resets_in_seconds"));
}

#[test]
fn stuck_scenario_writes_stuck_status() {
    let dir = tempfile::tempdir().unwrap();
    codex_stub_cmd(dir.path())
        .env("RALPH_STUB_SCENARIO", "stuck")
        .assert()
        .success();

    let status = fs::read_to_string(dir.path().join(".ralph/status")).unwrap();
    assert_eq!(status.trim(), "STUCK");
}
