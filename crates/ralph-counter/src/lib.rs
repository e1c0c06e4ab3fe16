//! The verification-counter state machine.
//!
//! Pure by construction: no I/O, deterministic, and the sole authority on
//! when the loop should exit. See [`handle_status`].

use ralph_state::{MultiSpecState, SpecProgress, Status};

pub const DONE_THRESHOLD: i64 = 3;

/// What the loop engine should do after applying a status signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Exit(i32),
}

/// Result of one application of the counter state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub action: Action,
    pub state: MultiSpecState,
    pub current_spec_done_count: i64,
}

/// Apply one iteration's signal to `state` and decide whether the loop
/// should continue or exit.
///
/// `spec_index` identifies the spec that was just processed. `files_changed`
/// is the (possibly empty) list of paths the snapshot comparator found
/// different. `current_hash` is the current spec's content hash, recorded
/// into `last_hash` for the next run's tier-1 priority classification.
pub fn handle_status(
    state: &MultiSpecState,
    spec_index: i64,
    status: Status,
    files_changed: &[String],
    current_hash: Option<&str>,
) -> Outcome {
    let mut specs = state.specs.clone();
    let has_file_changes = !files_changed.is_empty();

    let index_valid = !specs.is_empty() && spec_index >= 0 && (spec_index as usize) < specs.len();

    if !index_valid {
        let updated = MultiSpecState {
            status,
            specs,
            ..state.clone()
        };
        let action = if status == Status::Stuck {
            Action::Exit(2)
        } else {
            Action::Continue
        };
        return Outcome {
            action,
            state: updated,
            current_spec_done_count: 0,
        };
    }

    let spec_index = spec_index as usize;

    if has_file_changes {
        for (idx, spec) in specs.iter_mut().enumerate() {
            if idx == spec_index {
                continue;
            }
            if spec.done_count >= DONE_THRESHOLD {
                spec.done_count = 2;
            }
        }
    }

    let current_hash_owned = current_hash.map(str::to_string);

    if status == Status::Done {
        if !has_file_changes {
            let next = (specs[spec_index].done_count + 1).min(DONE_THRESHOLD);
            apply_update(&mut specs[spec_index], next, status, current_hash_owned, false);
        } else {
            apply_update(&mut specs[spec_index], 1, status, current_hash_owned, true);
        }
    } else if has_file_changes {
        apply_update(&mut specs[spec_index], 0, status, current_hash_owned, true);
    } else {
        let unchanged = specs[spec_index].done_count;
        apply_update(&mut specs[spec_index], unchanged, status, current_hash_owned, false);
    }

    let spec_done_count = specs[spec_index].done_count;

    let updated = MultiSpecState {
        status,
        specs,
        ..state.clone()
    };

    let action = if status == Status::Stuck {
        Action::Exit(2)
    } else if !updated.specs.is_empty()
        && updated.specs.iter().all(|s| s.done_count >= DONE_THRESHOLD)
    {
        Action::Exit(0)
    } else {
        Action::Continue
    };

    Outcome {
        action,
        state: updated,
        current_spec_done_count: spec_done_count,
    }
}

fn apply_update(
    spec: &mut SpecProgress,
    done_count: i64,
    status: Status,
    current_hash: Option<String>,
    modified_files: bool,
) {
    spec.done_count = done_count;
    spec.last_status = Some(status.to_string());
    spec.last_hash = current_hash;
    spec.modified_files = modified_files;
}
