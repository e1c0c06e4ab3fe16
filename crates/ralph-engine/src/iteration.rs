//! One iteration of the loop: snapshot, invoke, classify, write history.

use crate::history::{first_non_empty_line, format_log_entry, LogEntryInput};
use camino::Utf8Path;
use chrono::Utc;
use ralph_agent::Agent;
use ralph_ignore::IgnoreSpec;
use ralph_prompt::{assemble_prompt, PromptContext};
use ralph_runner::ProcessOutput;
use ralph_snapshot::Snapshot;
use ralph_state::{
    append_crash_note, paths::handoff_path, read_guardrails, read_handoff, read_status,
    write_handoff, write_history, write_status, Status,
};
use ralph_utils::error::RalphError;
use std::time::Duration;

/// Result of one `run_iteration` call, carrying everything the counter state
/// machine and callers need.
#[derive(Debug, Clone)]
pub struct IterationResult {
    pub status: Status,
    pub files_changed: Vec<String>,
    pub test_result: Option<(i32, String)>,
    pub agent_output: String,
    pub agent_exit_code: i32,
    pub exhaustion_reason: Option<String>,
    pub crash_summary: Option<String>,
}

/// Run a 5-minute-capped shell test command, mirroring the semantics of a
/// purely informational side-channel: its result never affects the loop.
pub fn run_test_command(cmd: &str) -> (i32, String) {
    let argv = if cfg!(windows) {
        vec!["cmd".to_string(), "/C".to_string(), cmd.to_string()]
    } else {
        vec!["sh".to_string(), "-c".to_string(), cmd.to_string()]
    };

    match ralph_runner::invoke("test-command", &argv, Duration::from_secs(300), None) {
        Ok(output) if output.timed_out => (-1, "Test command timed out".to_string()),
        Ok(output) => (output.exit_code, format!("{}{}", output.stdout, output.stderr)),
        Err(e) => (-1, format!("Test command failed: {e}")),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run_iteration(
    root: &Utf8Path,
    ignore: &IgnoreSpec,
    iteration: i64,
    max_iterations: i64,
    test_cmd: Option<&str>,
    agent: &dyn Agent,
    spec_path: &str,
    spec_goal: &str,
    done_count: i64,
    timeout: Duration,
    tee_path: Option<&Utf8Path>,
) -> Result<IterationResult, RalphError> {
    let snapshot_before = Snapshot::capture(root.as_std_path(), ignore)?;

    let handoff = read_handoff(root, Some(spec_path));
    let guardrails = read_guardrails(root);
    let handoff_file = handoff_path(root, Some(spec_path));

    let prompt = assemble_prompt(&PromptContext {
        iteration: iteration.max(0) as u32,
        max_iterations: max_iterations.max(0) as u32,
        done_count,
        goal: spec_goal,
        handoff: &handoff,
        guardrails: &guardrails,
        spec_path,
        handoff_path: handoff_file.as_str(),
    });

    write_status(Status::Idle, root)?;

    if let Some(tee) = tee_path {
        if let Some(parent) = tee.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(tee.as_std_path(), "")?;
    }

    let output = match agent.invoke(&prompt, timeout, tee_path.map(Utf8Path::as_std_path)) {
        Ok(output) => output,
        Err(source) => ProcessOutput {
            stdout: String::new(),
            stderr: source.to_string(),
            exit_code: -1,
            timed_out: false,
        },
    };

    let mut status = read_status(root);

    let exhaustion = agent.exhaustion(&output);
    let crash = if exhaustion.is_none() {
        ralph_runner::detect_crash(&output)
    } else {
        None
    };

    let snapshot_after = Snapshot::capture(root.as_std_path(), ignore)?;
    let files_changed = Snapshot::compare(&snapshot_before, &snapshot_after);

    if let Some(crash_info) = &crash {
        status = Status::Rotate;
        write_status(status, root)?;
        let error_summary = first_non_empty_line(&output.stderr);
        let updated = append_crash_note(&handoff, &crash_info.summary, output.exit_code, error_summary);
        write_handoff(&updated, root, Some(spec_path))?;
    }

    let test_result = test_cmd.map(run_test_command);

    let timestamp = Utc::now().to_rfc3339();
    let log_content = format_log_entry(&LogEntryInput {
        iteration,
        timestamp_rfc3339: &timestamp,
        agent_name: agent.name(),
        prompt: &prompt,
        agent_output: &output.stdout,
        agent_error: if output.stderr.is_empty() {
            None
        } else {
            Some(output.stderr.as_str())
        },
        status,
        files_changed: &files_changed,
        test_result: test_result.as_ref(),
        agent_exit_code: Some(output.exit_code),
        crash_summary: crash.as_ref().map(|c| c.summary.as_str()),
    });
    write_history(iteration, &log_content, root, Some(spec_path))?;

    Ok(IterationResult {
        status,
        files_changed,
        test_result,
        agent_output: output.stdout,
        agent_exit_code: output.exit_code,
        exhaustion_reason: exhaustion.map(|info| info.reason),
        crash_summary: crash.map(|c| c.summary),
    })
}
