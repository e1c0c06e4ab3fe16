//! Priority ordering: decides where to resume at startup, and which spec to
//! run next under the "focused execution" policy after each iteration.

use ralph_state::{MultiSpecState, Status};
use std::cmp::Ordering;

const DONE_THRESHOLD: i64 = 3;

/// Five-tier priority key; lower sorts first. Tier 4 additionally orders by
/// `done_count` ascending for fair interleaving among clean, fully-verified
/// specs that were downgraded by propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PriorityKey {
    tier: u8,
    done_count: i64,
    rel_posix: String,
}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then(self.done_count.cmp(&other.done_count))
            .then(self.rel_posix.cmp(&other.rel_posix))
    }
}

/// Compute the priority tier for one spec given its recorded progress and
/// current content hash.
fn priority_key(
    rel_posix: &str,
    last_status: Option<&str>,
    last_hash: Option<&str>,
    current_hash: Option<&str>,
    modified_files: bool,
) -> PriorityKey {
    let is_new = last_status.is_none();
    let is_modified = last_hash.is_some() && current_hash.is_some() && last_hash != current_hash;

    let (tier, done_count) = if is_new {
        (0, 0)
    } else if is_modified {
        (1, 0)
    } else if last_status != Some(Status::Done.to_string().as_str()) {
        (2, 0)
    } else if modified_files {
        (3, 0)
    } else {
        (4, 0)
    };

    PriorityKey {
        tier,
        done_count,
        rel_posix: rel_posix.to_string(),
    }
}

/// Sort a list of `(rel_posix, current_hash)` pairs by priority, consulting
/// `state` for each spec's recorded progress.
pub fn sort_by_priority(
    specs: &[(String, Option<String>)],
    state: &MultiSpecState,
) -> Vec<String> {
    let mut with_keys: Vec<(PriorityKey, String)> = specs
        .iter()
        .map(|(rel_posix, current_hash)| {
            let progress = state.specs.iter().find(|s| &s.path == rel_posix);
            let key = match progress {
                Some(p) => priority_key(
                    rel_posix,
                    p.last_status.as_deref(),
                    p.last_hash.as_deref(),
                    current_hash.as_deref(),
                    p.modified_files,
                ),
                None => priority_key(rel_posix, None, None, current_hash.as_deref(), false),
            };
            // Tier 4's done_count sub-order needs the spec's actual done_count.
            let key = PriorityKey {
                done_count: progress.map(|p| p.done_count).unwrap_or(0),
                ..key
            };
            (key, rel_posix.clone())
        })
        .collect();

    with_keys.sort_by(|a, b| a.0.cmp(&b.0));
    with_keys.into_iter().map(|(_, path)| path).collect()
}

/// At startup: after `sort_by_priority`, pick the index (into `state.specs`)
/// of the first spec that still needs work. `None` means every spec is
/// already at the completion threshold.
pub fn select_startup_index(sorted_paths: &[String], state: &MultiSpecState) -> Option<usize> {
    for path in sorted_paths {
        if let Some(idx) = state.specs.iter().position(|s| &s.path == path) {
            if state.specs[idx].done_count < DONE_THRESHOLD {
                return Some(idx);
            }
        }
    }
    None
}

/// Post-iteration focused-execution selection. `current_index` is the spec
/// index just processed; `added_paths` are specs newly discovered since the
/// previous iteration. Returns the index to run next.
pub fn select_next_index(
    sorted_paths: &[String],
    state: &MultiSpecState,
    current_index: usize,
    current_status: Status,
    current_had_changes: bool,
    added_paths: &[String],
) -> usize {
    if state.specs.is_empty() {
        return current_index;
    }

    if current_status == Status::Done && !current_had_changes {
        let current_path = &state.specs[current_index].path;

        for path in sorted_paths {
            if path == current_path {
                continue;
            }
            if let Some(idx) = state.specs.iter().position(|s| &s.path == path) {
                if state.specs[idx].done_count < DONE_THRESHOLD {
                    return idx;
                }
            }
        }

        if state.specs[current_index].done_count < DONE_THRESHOLD {
            return current_index;
        }
        current_index
    } else {
        for path in sorted_paths {
            if added_paths.contains(path) {
                if let Some(idx) = state.specs.iter().position(|s| &s.path == path) {
                    return idx;
                }
            }
        }
        current_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ralph_state::SpecProgress;

    fn state_with(specs: Vec<SpecProgress>) -> MultiSpecState {
        MultiSpecState {
            version: 1,
            iteration: 0,
            status: Status::Idle,
            current_index: 0,
            specs,
        }
    }

    #[test]
    fn new_specs_sort_first() {
        let mut done = SpecProgress::new("a.spec.md");
        done.done_count = 3;
        done.last_status = Some("DONE".to_string());
        let new_spec = SpecProgress::new("b.spec.md");
        let state = state_with(vec![done, new_spec]);

        let specs = vec![
            ("a.spec.md".to_string(), None),
            ("b.spec.md".to_string(), None),
        ];
        let sorted = sort_by_priority(&specs, &state);
        assert_eq!(sorted[0], "b.spec.md");
    }

    #[test]
    fn modified_spec_outranks_in_progress_but_not_new() {
        let mut modified = SpecProgress::new("a.spec.md");
        modified.last_status = Some("DONE".to_string());
        modified.last_hash = Some("old".to_string());
        let mut in_progress = SpecProgress::new("b.spec.md");
        in_progress.last_status = Some("CONTINUE".to_string());
        in_progress.last_hash = Some("same".to_string());
        let state = state_with(vec![modified, in_progress]);

        let specs = vec![
            ("a.spec.md".to_string(), Some("new".to_string())),
            ("b.spec.md".to_string(), Some("same".to_string())),
        ];
        let sorted = sort_by_priority(&specs, &state);
        assert_eq!(sorted[0], "a.spec.md");
    }

    #[test]
    fn tier4_orders_by_done_count_ascending() {
        let mut a = SpecProgress::new("a.spec.md");
        a.done_count = 3;
        a.last_status = Some("DONE".to_string());
        let mut b = SpecProgress::new("b.spec.md");
        b.done_count = 1;
        b.last_status = Some("DONE".to_string());
        let state = state_with(vec![a, b]);

        let specs = vec![
            ("a.spec.md".to_string(), None),
            ("b.spec.md".to_string(), None),
        ];
        let sorted = sort_by_priority(&specs, &state);
        assert_eq!(sorted, vec!["b.spec.md".to_string(), "a.spec.md".to_string()]);
    }

    #[test]
    fn clean_done_switches_to_other_spec_needing_work() {
        let mut a = SpecProgress::new("a.spec.md");
        a.done_count = 3;
        let mut b = SpecProgress::new("b.spec.md");
        b.done_count = 1;
        let state = state_with(vec![a, b]);

        let sorted = vec!["b.spec.md".to_string(), "a.spec.md".to_string()];
        let next = select_next_index(&sorted, &state, 0, Status::Done, false, &[]);
        assert_eq!(next, 1);
    }

    #[test]
    fn in_progress_spec_holds_focus_unless_new_spec_arrives() {
        let a = SpecProgress::new("a.spec.md");
        let b = SpecProgress::new("b.spec.md");
        let state = state_with(vec![a, b]);

        let sorted = vec!["a.spec.md".to_string(), "b.spec.md".to_string()];
        let next = select_next_index(&sorted, &state, 0, Status::Continue, true, &[]);
        assert_eq!(next, 0);
    }

    #[test]
    fn new_spec_interrupts_focus() {
        let a = SpecProgress::new("a.spec.md");
        let c = SpecProgress::new("c.spec.md");
        let state = state_with(vec![a, c]);

        let sorted = vec!["c.spec.md".to_string(), "a.spec.md".to_string()];
        let next = select_next_index(&sorted, &state, 0, Status::Continue, true, &["c.spec.md".to_string()]);
        assert_eq!(next, 1);
    }
}
