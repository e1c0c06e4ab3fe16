//! On-disk layout constants and path helpers for `.ralph/`.

use camino::{Utf8Path, Utf8PathBuf};
use ralph_spec::spec_resource_key;

pub const RALPH_DIR: &str = ".ralph";
pub const HANDOFF_FILE: &str = "handoff.md";
pub const GUARDRAILS_FILE: &str = "guardrails.md";
pub const STATUS_FILE: &str = "status";
pub const ITERATION_FILE: &str = "iteration";
pub const DONE_COUNT_FILE: &str = "done_count";
pub const HISTORY_DIR: &str = "history";
pub const HANDOFF_DIR: &str = "handoffs";
pub const STATE_FILE: &str = "state.json";
pub const RUN_DIR: &str = "run";
pub const RUN_STATE_FILE: &str = "run_state.json";
pub const TEE_FILE: &str = "live.log";

pub fn ralph_dir(root: &Utf8Path) -> Utf8PathBuf {
    root.join(RALPH_DIR)
}

pub fn state_path(root: &Utf8Path) -> Utf8PathBuf {
    ralph_dir(root).join(STATE_FILE)
}

pub fn iteration_path(root: &Utf8Path) -> Utf8PathBuf {
    ralph_dir(root).join(ITERATION_FILE)
}

pub fn done_count_path(root: &Utf8Path) -> Utf8PathBuf {
    ralph_dir(root).join(DONE_COUNT_FILE)
}

pub fn status_path(root: &Utf8Path) -> Utf8PathBuf {
    ralph_dir(root).join(STATUS_FILE)
}

pub fn guardrails_path(root: &Utf8Path) -> Utf8PathBuf {
    ralph_dir(root).join(GUARDRAILS_FILE)
}

pub fn legacy_handoff_path(root: &Utf8Path) -> Utf8PathBuf {
    ralph_dir(root).join(HANDOFF_FILE)
}

/// Per-spec handoff path; `None` yields the legacy workspace-wide handoff.
pub fn handoff_path(root: &Utf8Path, spec_path: Option<&str>) -> Utf8PathBuf {
    match spec_path {
        None => legacy_handoff_path(root),
        Some(spec_path) => {
            let key = spec_resource_key(spec_path);
            ralph_dir(root).join(HANDOFF_DIR).join(format!("{key}.md"))
        }
    }
}

/// Per-spec history directory; `None` yields the base history directory.
pub fn history_dir(root: &Utf8Path, spec_path: Option<&str>) -> Utf8PathBuf {
    let base = ralph_dir(root).join(HISTORY_DIR);
    match spec_path {
        None => base,
        Some(spec_path) => base.join(spec_resource_key(spec_path)),
    }
}

/// Zero-padded (3 digits) history log file for one iteration of one spec.
pub fn history_file(root: &Utf8Path, spec_path: Option<&str>, iteration: i64) -> Utf8PathBuf {
    history_dir(root, spec_path).join(format!("{iteration:03}.log"))
}

pub fn run_dir(root: &Utf8Path) -> Utf8PathBuf {
    ralph_dir(root).join(RUN_DIR)
}

pub fn run_state_path(root: &Utf8Path) -> Utf8PathBuf {
    run_dir(root).join(RUN_STATE_FILE)
}

pub fn tee_path(root: &Utf8Path) -> Utf8PathBuf {
    run_dir(root).join(TEE_FILE)
}
