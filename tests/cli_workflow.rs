//! End-to-end tests for the `init`/`status`/`reset` subcommands against a
//! scratch workspace. These never spawn an assistant CLI.

use assert_cmd::Command;
use predicates::prelude::*;

fn ralph_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("ralph").unwrap();
    cmd.arg("--root").arg(dir);
    cmd
}

#[test]
fn init_scaffolds_workspace_and_starter_prompt() {
    let dir = tempfile::tempdir().unwrap();

    ralph_cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote starter PROMPT.md"));

    assert!(dir.path().join(".ralph/specs").is_dir());
    assert!(dir.path().join(".ralph/history").is_dir());
    assert!(dir.path().join(".ralph/handoffs").is_dir());
    assert!(dir.path().join(".ralph/guardrails.md").is_file());
    assert!(dir.path().join("PROMPT.md").is_file());
}

#[test]
fn init_does_not_overwrite_an_existing_prompt() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("PROMPT.md"), "# My goal\n").unwrap();

    ralph_cmd(dir.path()).arg("init").assert().success();

    let content = std::fs::read_to_string(dir.path().join("PROMPT.md")).unwrap();
    assert_eq!(content, "# My goal\n");
}

#[test]
fn status_before_any_run_reports_no_state() {
    let dir = tempfile::tempdir().unwrap();
    ralph_cmd(dir.path()).arg("init").assert().success();

    ralph_cmd(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No state recorded yet"))
        .stdout(predicate::str::contains("no run currently live"));
}

#[test]
fn status_json_is_well_formed_json() {
    let dir = tempfile::tempdir().unwrap();
    ralph_cmd(dir.path()).arg("init").assert().success();

    let output = ralph_cmd(dir.path())
        .args(["status", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(parsed.get("state").is_some());
    assert!(parsed.get("live_run").is_some());
}

#[test]
fn reset_without_yes_aborts_without_a_tty() {
    let dir = tempfile::tempdir().unwrap();
    ralph_cmd(dir.path()).arg("init").assert().success();

    ralph_cmd(dir.path())
        .arg("reset")
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aborted"));
}

#[test]
fn reset_yes_clears_progress() {
    let dir = tempfile::tempdir().unwrap();
    ralph_cmd(dir.path()).arg("init").assert().success();

    ralph_cmd(dir.path())
        .args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workspace reset"));
}
