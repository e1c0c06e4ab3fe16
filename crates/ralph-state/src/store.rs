//! The State Store: `ensure_state` and all file-backed readers/writers.

use camino::Utf8Path;
use ralph_spec::{is_prompt_path, spec_content_hash};
use ralph_utils::atomic_write::write_file_atomic;
use ralph_utils::error::StateError;

use crate::model::{
    MultiSpecState, RunState, SpecProgress, Status, STATE_VERSION, parse_status_or_continue,
    state_from_json,
};
use crate::paths::*;
use crate::templates::{GUARDRAILS_TEMPLATE, HANDOFF_TEMPLATE};

fn read_file_trimmed(path: &Utf8Path, default: &str) -> String {
    match std::fs::read_to_string(path.as_std_path()) {
        Ok(content) => content.trim().to_string(),
        Err(_) => default.to_string(),
    }
}

fn write_file_raw(path: &Utf8Path, content: &str) -> Result<(), StateError> {
    write_file_atomic(path, content).map_err(|e| StateError::WriteFailed {
        path: path.to_string(),
        source: std::io::Error::other(e.to_string()),
    })?;
    Ok(())
}

fn legacy_int(path: &Utf8Path, default: i64) -> i64 {
    read_file_trimmed(path, &default.to_string())
        .parse()
        .unwrap_or(default)
}

fn legacy_status(path: &Utf8Path) -> Status {
    let content = read_file_trimmed(path, "IDLE").to_ascii_uppercase();
    parse_status_or_continue(&content)
}

pub fn read_multi_state(root: &Utf8Path) -> Option<MultiSpecState> {
    let path = state_path(root);
    let text = std::fs::read_to_string(path.as_std_path()).ok()?;
    state_from_json(&text)
}

pub fn write_multi_state(state: &MultiSpecState, root: &Utf8Path) -> Result<(), StateError> {
    let path = state_path(root);
    let text = serde_json::to_string_pretty(state).map_err(|source| StateError::ParseFailed {
        path: path.to_string(),
        source,
    })?;
    write_file_raw(&path, &text)
}

fn ensure_dirs(root: &Utf8Path) -> std::io::Result<()> {
    std::fs::create_dir_all(ralph_dir(root).join(HANDOFF_DIR))?;
    std::fs::create_dir_all(ralph_dir(root).join(HISTORY_DIR))?;
    Ok(())
}

fn ensure_spec_resources(spec_paths: &[String], root: &Utf8Path) -> Result<(), StateError> {
    let legacy_handoff = legacy_handoff_path(root);
    let single_prompt = spec_paths.len() == 1 && is_prompt_path(&spec_paths[0]);
    let skip_prompt_handoff = single_prompt && legacy_handoff.as_std_path().exists();

    for spec_path in spec_paths {
        if !(skip_prompt_handoff && is_prompt_path(spec_path)) {
            let path = handoff_path(root, Some(spec_path));
            if !path.as_std_path().exists() {
                write_file_raw(&path, HANDOFF_TEMPLATE)?;
            }
        }
        std::fs::create_dir_all(history_dir(root, Some(spec_path)).as_std_path())
            .map_err(|source| StateError::WriteFailed {
                path: history_dir(root, Some(spec_path)).to_string(),
                source,
            })?;
    }
    Ok(())
}

fn migrate_legacy_assets(spec_paths: &[String], root: &Utf8Path) -> Result<(), StateError> {
    let legacy_handoff = legacy_handoff_path(root);

    let prompt_spec = spec_paths.iter().find(|p| is_prompt_path(p));

    if let Some(prompt_spec) = prompt_spec {
        if legacy_handoff.as_std_path().exists() {
            let spec_handoff = handoff_path(root, Some(prompt_spec));
            if !spec_handoff.as_std_path().exists() {
                let content = read_file_trimmed(&legacy_handoff, HANDOFF_TEMPLATE);
                write_file_raw(&spec_handoff, &content)?;
            }
        }
    }

    let history_root = history_dir(root, None);
    if history_root.as_std_path().is_dir() {
        let entries: Vec<_> = std::fs::read_dir(history_root.as_std_path())
            .into_iter()
            .flatten()
            .filter_map(|e| e.ok())
            .collect();
        let log_files: Vec<_> = entries
            .iter()
            .filter(|e| e.path().is_file() && e.file_name().to_string_lossy().ends_with(".log"))
            .collect();
        let has_subdirs = entries.iter().any(|e| e.path().is_dir());

        if !log_files.is_empty() && !has_subdirs && spec_paths.len() == 1 {
            let spec_history_dir = history_dir(root, Some(&spec_paths[0]));
            std::fs::create_dir_all(spec_history_dir.as_std_path()).map_err(|source| {
                StateError::WriteFailed {
                    path: spec_history_dir.to_string(),
                    source,
                }
            })?;
            for log_file in log_files {
                let dest = spec_history_dir.join(log_file.file_name().to_string_lossy().as_ref());
                let _ = std::fs::rename(log_file.path(), dest.as_std_path());
            }
        }
    }
    Ok(())
}

/// Load `state.json` and sync it with the currently-discovered `spec_paths`,
/// migrating legacy single-spec files on first run. See the module-level
/// design notes for the full sync algorithm.
pub fn ensure_state(spec_paths: &[String], root: &Utf8Path) -> Result<MultiSpecState, StateError> {
    ensure_dirs(root).map_err(|source| StateError::WriteFailed {
        path: ralph_dir(root).to_string(),
        source,
    })?;

    let existing = read_multi_state(root);
    let spec_set: std::collections::HashSet<&String> = spec_paths.iter().collect();

    let state = match existing {
        None => {
            let legacy_iteration = legacy_int(&iteration_path(root), 0);
            let legacy_done_count = legacy_int(&done_count_path(root), 0);
            let legacy_status = legacy_status(&status_path(root));

            let mut specs: Vec<SpecProgress> =
                spec_paths.iter().map(|p| SpecProgress::new(p.clone())).collect();
            if specs.len() == 1 {
                specs[0].done_count = legacy_done_count;
            }

            let state = MultiSpecState {
                version: STATE_VERSION,
                iteration: legacy_iteration,
                status: legacy_status,
                current_index: 0,
                specs,
            };
            write_multi_state(&state, root)?;
            migrate_legacy_assets(spec_paths, root)?;
            state
        }
        Some(existing_state) => {
            let existing_paths: Vec<String> =
                existing_state.specs.iter().map(|s| s.path.clone()).collect();
            let existing_set: std::collections::HashSet<&String> = existing_paths.iter().collect();
            let spec_set_changed = spec_set != existing_set;

            let current_path = existing_state
                .specs
                .get(existing_state.current_index as usize)
                .filter(|_| {
                    existing_state.current_index >= 0
                        && (existing_state.current_index as usize) < existing_state.specs.len()
                })
                .map(|s| s.path.clone());

            let mut path_order: Vec<String> = existing_paths
                .iter()
                .filter(|p| spec_set.contains(p))
                .cloned()
                .collect();
            for p in spec_paths {
                if !existing_set.contains(p) {
                    path_order.push(p.clone());
                }
            }

            let existing_map: std::collections::HashMap<&String, &SpecProgress> =
                existing_state.specs.iter().map(|s| (&s.path, s)).collect();

            let mut migrated_hashes = false;
            let mut new_specs = Vec::with_capacity(path_order.len());

            for path in &path_order {
                let existing_spec = existing_map.get(path).copied();
                let mut done_count = existing_spec.map(|s| s.done_count).unwrap_or(0);
                let mut last_status = existing_spec.and_then(|s| s.last_status.clone());
                let mut last_hash = existing_spec.and_then(|s| s.last_hash.clone());
                let mut modified_files = existing_spec.map(|s| s.modified_files).unwrap_or(false);

                let current_hash = spec_content_hash(root.join(path).as_std_path());
                let spec_modified = last_hash.is_some()
                    && current_hash.is_some()
                    && last_hash != current_hash;

                if existing_spec.is_some() && last_hash.is_none() && current_hash.is_some() {
                    last_hash = current_hash.clone();
                    migrated_hashes = true;
                }

                if spec_modified {
                    done_count = 0;
                    last_status = None;
                    modified_files = false;
                }

                new_specs.push(SpecProgress {
                    path: path.clone(),
                    done_count,
                    last_status,
                    last_hash,
                    modified_files,
                });
            }

            let current_index = current_path
                .as_ref()
                .and_then(|p| path_order.iter().position(|x| x == p))
                .unwrap_or(0) as i64;

            let updated = MultiSpecState {
                version: existing_state.version,
                iteration: existing_state.iteration,
                status: existing_state.status,
                current_index,
                specs: new_specs,
            };

            if spec_set_changed || current_index != existing_state.current_index || migrated_hashes {
                write_multi_state(&updated, root)?;
            }
            updated
        }
    };

    ensure_spec_resources(spec_paths, root)?;
    Ok(state)
}

pub fn read_iteration(root: &Utf8Path) -> i64 {
    match read_multi_state(root) {
        Some(state) => state.iteration,
        None => legacy_int(&iteration_path(root), 0),
    }
}

pub fn write_iteration(iteration: i64, root: &Utf8Path) -> Result<(), StateError> {
    write_file_raw(&iteration_path(root), &iteration.to_string())?;
    if let Some(mut state) = read_multi_state(root) {
        state.iteration = iteration;
        write_multi_state(&state, root)?;
    }
    Ok(())
}

pub fn read_done_count(root: &Utf8Path) -> i64 {
    if let Some(state) = read_multi_state(root) {
        if let Some(spec) = state
            .specs
            .get(state.current_index.max(0) as usize)
            .filter(|_| state.current_index >= 0 && (state.current_index as usize) < state.specs.len())
        {
            return spec.done_count;
        }
    }
    legacy_int(&done_count_path(root), 0)
}

pub fn write_done_count(count: i64, root: &Utf8Path) -> Result<(), StateError> {
    write_file_raw(&done_count_path(root), &count.to_string())?;
    if let Some(mut state) = read_multi_state(root) {
        if state.current_index >= 0 && (state.current_index as usize) < state.specs.len() {
            state.specs[state.current_index as usize].done_count = count;
            write_multi_state(&state, root)?;
        }
    }
    Ok(())
}

pub fn read_status(root: &Utf8Path) -> Status {
    legacy_status(&status_path(root))
}

pub fn write_status(status: Status, root: &Utf8Path) -> Result<(), StateError> {
    write_file_raw(&status_path(root), &status.to_string())
}

pub fn read_handoff(root: &Utf8Path, spec_path: Option<&str>) -> String {
    let path = handoff_path(root, spec_path);
    if spec_path.is_some() && !path.as_std_path().exists() {
        let legacy = legacy_handoff_path(root);
        if legacy.as_std_path().exists() {
            return read_file_trimmed(&legacy, HANDOFF_TEMPLATE);
        }
    }
    read_file_trimmed(&path, HANDOFF_TEMPLATE)
}

pub fn write_handoff(content: &str, root: &Utf8Path, spec_path: Option<&str>) -> Result<(), StateError> {
    write_file_raw(&handoff_path(root, spec_path), content)
}

pub fn read_guardrails(root: &Utf8Path) -> String {
    read_file_trimmed(&guardrails_path(root), GUARDRAILS_TEMPLATE)
}

pub fn write_guardrails(content: &str, root: &Utf8Path) -> Result<(), StateError> {
    write_file_raw(&guardrails_path(root), content)
}

pub fn write_history(
    iteration: i64,
    content: &str,
    root: &Utf8Path,
    spec_path: Option<&str>,
) -> Result<(), StateError> {
    write_file_raw(&history_file(root, spec_path, iteration), content)
}

/// Append a crash annotation to the end of a handoff document, creating the
/// `## Notes` heading if it is missing.
pub fn append_crash_note(
    handoff: &str,
    summary: &str,
    exit_code: i32,
    error_summary: Option<&str>,
) -> String {
    let mut note = format!("- Previous rotation crashed: {summary}\n  - Exit code: {exit_code}\n");
    if let Some(error_summary) = error_summary {
        note.push_str(&format!("  - Error: {error_summary}\n"));
    }

    let mut block = String::new();
    if !handoff.contains("## Notes") {
        block.push_str("## Notes\n");
    }
    block.push_str(&note);

    format!("{}\n{}\n", handoff.trim_end(), block.trim_end())
}

/// Persist the ephemeral run-state sentinel under `.ralph/run/`.
pub fn write_run_state(run_state: &RunState, root: &Utf8Path) -> Result<(), StateError> {
    let path = run_state_path(root);
    let text = serde_json::to_string_pretty(run_state).map_err(|source| StateError::ParseFailed {
        path: path.to_string(),
        source,
    })?;
    write_file_raw(&path, &text)
}

/// Remove the run-state sentinel. Best-effort: a missing file is not an error.
pub fn delete_run_state(root: &Utf8Path) {
    let _ = std::fs::remove_file(run_state_path(root).as_std_path());
}
