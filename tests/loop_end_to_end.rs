//! Drives `ralph run` against the `claude-stub`/`codex-stub` dev-tools
//! binaries, exercising the full loop without a real assistant CLI.
//!
//! Gated behind the `dev-tools` feature; run with
//! `cargo test --features dev-tools --test loop_end_to_end`.

use assert_cmd::cargo::cargo_bin;
use std::fs;
use std::path::{Path, PathBuf};

/// Builds a scratch `PATH` entry containing `claude` and `codex` symlinked
/// (or copied, on platforms without symlinks) from the compiled stub
/// binaries, so `which::which("claude")` resolves inside the test sandbox.
fn stub_path_dir() -> PathBuf {
    let dir = tempfile::tempdir().unwrap().keep();
    link_stub(&cargo_bin("claude-stub"), &dir.join("claude"));
    link_stub(&cargo_bin("codex-stub"), &dir.join("codex"));
    dir
}

#[cfg(unix)]
fn link_stub(src: &Path, dst: &Path) {
    std::os::unix::fs::symlink(src, dst).unwrap();
}

#[cfg(not(unix))]
fn link_stub(src: &Path, dst: &Path) {
    fs::copy(src, dst).unwrap();
}

fn ralph_cmd(dir: &Path, stub_dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("ralph").unwrap();
    let path = std::env::var("PATH").unwrap_or_default();
    cmd.current_dir(dir)
        .arg("--root")
        .arg(dir)
        .env("PATH", format!("{}:{path}", stub_dir.display()))
        .env("RALPH_STUB_SCENARIO", "success");
    cmd
}

fn init_workspace(dir: &Path, goal: &str) {
    fs::write(dir.join("PROMPT.md"), goal).unwrap();
}

#[test]
fn single_spec_happy_path_reaches_done_in_three_rotations() {
    let workdir = tempfile::tempdir().unwrap();
    let dir = workdir.path();
    init_workspace(dir, "# Build the thing\n\nDo the thing end to end.\n");
    let stub_dir = stub_path_dir();

    let assert = ralph_cmd(dir, &stub_dir)
        .args(["run", "--agent", "claude"])
        .assert()
        .success();
    let output = assert.get_output();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Goal achieved"), "stdout was: {stdout}");

    let state_raw = fs::read_to_string(dir.join(".ralph/state.json")).unwrap();
    let state: serde_json::Value = serde_json::from_str(&state_raw).unwrap();
    assert_eq!(state["status"], "DONE");
    let specs = state["specs"].as_array().unwrap();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0]["done_count"], 3);
    assert_eq!(state["iteration"], 3);

    assert!(!dir.join(".ralph/run/run_state.json").exists());

    let history_dir = dir.join(".ralph/history");
    let mut log_files: Vec<_> = walk_logs(&history_dir);
    log_files.sort();
    assert_eq!(log_files.len(), 3);
}

#[test]
fn crash_scenario_rotates_and_appends_handoff_note_without_misattributing_changes() {
    let workdir = tempfile::tempdir().unwrap();
    let dir = workdir.path();
    init_workspace(dir, "# Build the thing\n\nDo the thing end to end.\n");
    let stub_dir = stub_path_dir();

    let assert = ralph_cmd(dir, &stub_dir)
        .env("RALPH_STUB_SCENARIO", "crash")
        .args(["run", "--agent", "claude", "--max-iterations", "1"])
        .assert();
    assert.success();

    let state_raw = fs::read_to_string(dir.join(".ralph/state.json")).unwrap();
    let state: serde_json::Value = serde_json::from_str(&state_raw).unwrap();
    let specs = state["specs"].as_array().unwrap();
    assert_eq!(specs[0]["done_count"], 0);
    assert_eq!(specs[0]["modified_files"], false);

    let handoffs_dir = dir.join(".ralph/handoffs");
    let handoff_files = walk_logs(&handoffs_dir);
    assert_eq!(handoff_files.len(), 1);
    let note = fs::read_to_string(&handoff_files[0]).unwrap();
    assert!(note.contains("## Notes"));
}

fn walk_logs(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .flat_map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                walk_logs(&path)
            } else {
                vec![path]
            }
        })
        .collect()
}
