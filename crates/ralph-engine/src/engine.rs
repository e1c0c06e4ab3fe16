//! The outer loop: discover specs, sync state, pick a spec and an agent,
//! run one iteration, apply the counter, ask the scheduler for what's next.

use crate::iteration::{run_iteration, IterationResult};
use camino::Utf8Path;
use chrono::Utc;
use ralph_agent::AgentPool;
use ralph_counter::{handle_status, Action, DONE_THRESHOLD};
use ralph_ignore::IgnoreSpec;
use ralph_scheduler::{select_next_index, select_startup_index, sort_by_priority};
use ralph_spec::{discover_specs, read_spec_content, spec_content_hash};
use ralph_state::{
    delete_run_state, ensure_state, write_done_count, write_iteration, write_multi_state,
    write_run_state, MultiSpecState, RunState,
};
use ralph_utils::error::{RalphError, SpecError};
use std::collections::HashSet;
use std::time::Duration;

/// Tunables for one `run_loop` invocation.
#[derive(Debug, Clone)]
pub struct LoopOptions {
    pub max_iterations: i64,
    pub test_cmd: Option<String>,
    pub timeout: Duration,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            test_cmd: None,
            timeout: Duration::from_secs(10_800),
        }
    }
}

/// Outcome of a full `run_loop` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopResult {
    pub exit_code: i32,
    pub message: String,
    pub iterations_run: i64,
}

pub type IterationStartCallback<'a> = dyn FnMut(i64, i64, i64, &str, &str) + 'a;
pub type IterationEndCallback<'a> = dyn FnMut(i64, &IterationResult, i64, &str, &str) + 'a;

fn all_done(state: &MultiSpecState) -> bool {
    !state.specs.is_empty() && state.specs.iter().all(|s| s.done_count >= DONE_THRESHOLD)
}

/// Run the main loop until the goal is achieved, the pool drains, the
/// assistant signals `STUCK`, or `max_iterations` is hit. The run-state
/// sentinel is always deleted on exit, regardless of outcome.
pub fn run_loop(
    root: &Utf8Path,
    options: &LoopOptions,
    ignore: &IgnoreSpec,
    pool: &mut AgentPool,
    mut on_iteration_start: Option<&mut IterationStartCallback<'_>>,
    mut on_iteration_end: Option<&mut IterationEndCallback<'_>>,
) -> Result<LoopResult, RalphError> {
    let specs = discover_specs(root.as_std_path())?;
    if specs.is_empty() {
        return Ok(LoopResult {
            exit_code: 1,
            message: "No spec files found".to_string(),
            iterations_run: 0,
        });
    }

    let spec_paths: Vec<String> = specs.iter().map(|s| s.rel_posix.clone()).collect();
    let mut state = ensure_state(&spec_paths, root)?;

    if all_done(&state) {
        return Ok(LoopResult {
            exit_code: 0,
            message: "Goal achieved!".to_string(),
            iterations_run: 0,
        });
    }

    let priority_input: Vec<(String, Option<String>)> = specs
        .iter()
        .map(|s| (s.rel_posix.clone(), spec_content_hash(&s.path)))
        .collect();
    let sorted_paths = sort_by_priority(&priority_input, &state);

    if let Some(best_index) = select_startup_index(&sorted_paths, &state) {
        if state.current_index as usize != best_index {
            state.current_index = best_index as i64;
            write_multi_state(&state, root)?;
        }
    }

    let mut iteration = state.iteration;
    let mut iterations_run: i64 = 0;
    let started_at = Utc::now().to_rfc3339();

    write_run_state(
        &RunState {
            pid: std::process::id(),
            started_at_iso: started_at.clone(),
            iteration,
            max_iterations: options.max_iterations,
            agent_name: "pending".to_string(),
            agent_started_at_iso: started_at.clone(),
        },
        root,
    )?;

    let outcome = run_body(
        root,
        options,
        ignore,
        pool,
        &mut state,
        &mut iteration,
        &mut iterations_run,
        started_at,
        &mut on_iteration_start,
        &mut on_iteration_end,
    );

    delete_run_state(root);
    outcome
}

#[allow(clippy::too_many_arguments)]
fn run_body(
    root: &Utf8Path,
    options: &LoopOptions,
    ignore: &IgnoreSpec,
    pool: &mut AgentPool,
    state: &mut MultiSpecState,
    iteration: &mut i64,
    iterations_run: &mut i64,
    started_at: String,
    on_iteration_start: &mut Option<&mut IterationStartCallback<'_>>,
    on_iteration_end: &mut Option<&mut IterationEndCallback<'_>>,
) -> Result<LoopResult, RalphError> {
    while *iteration < options.max_iterations {
        if all_done(state) {
            return Ok(LoopResult {
                exit_code: 0,
                message: "Goal achieved!".to_string(),
                iterations_run: *iterations_run,
            });
        }

        if pool.is_empty() {
            return Ok(LoopResult {
                exit_code: 4,
                message: "All agents exhausted".to_string(),
                iterations_run: *iterations_run,
            });
        }

        let specs = discover_specs(root.as_std_path())?;
        if specs.is_empty() {
            return Ok(LoopResult {
                exit_code: 1,
                message: "No spec files found".to_string(),
                iterations_run: *iterations_run,
            });
        }
        let spec_paths: Vec<String> = specs.iter().map(|s| s.rel_posix.clone()).collect();
        *state = ensure_state(&spec_paths, root)?;

        let agent_name = match pool.select() {
            Some(agent) => agent.name().to_string(),
            None => {
                return Ok(LoopResult {
                    exit_code: 4,
                    message: "All agents exhausted".to_string(),
                    iterations_run: *iterations_run,
                });
            }
        };

        *iteration += 1;
        state.iteration = *iteration;
        write_multi_state(state, root)?;
        write_iteration(*iteration, root)?;
        *iterations_run += 1;

        write_run_state(
            &RunState {
                pid: std::process::id(),
                started_at_iso: started_at.clone(),
                iteration: *iteration,
                max_iterations: options.max_iterations,
                agent_name: agent_name.clone(),
                agent_started_at_iso: Utc::now().to_rfc3339(),
            },
            root,
        )?;

        let current_index = state.current_index as usize;
        let current_spec_progress = state.specs[current_index].clone();
        let spec = specs
            .iter()
            .find(|s| s.rel_posix == current_spec_progress.path)
            .ok_or_else(|| {
                RalphError::Spec(SpecError::NoSpecsFound {
                    root: root.to_string(),
                })
            })?;
        let spec_goal = read_spec_content(&spec.path).unwrap_or_default();

        if let Some(cb) = on_iteration_start.as_deref_mut() {
            cb(
                *iteration,
                options.max_iterations,
                current_spec_progress.done_count,
                &agent_name,
                &current_spec_progress.path,
            );
        }

        let tee = ralph_state::paths::tee_path(root);

        let iteration_result = {
            let agent = pool
                .select()
                .filter(|a| a.name() == agent_name)
                .expect("agent just selected above must still be present");
            run_iteration(
                root,
                ignore,
                *iteration,
                options.max_iterations,
                options.test_cmd.as_deref(),
                agent,
                &current_spec_progress.path,
                &spec_goal,
                current_spec_progress.done_count,
                options.timeout,
                Some(tee.as_path()),
            )?
        };

        let current_hash = spec_content_hash(&spec.path);

        let mut agent_exhausted = false;
        if let Some(reason) = iteration_result.exhaustion_reason.clone() {
            pool.remove(&agent_name);
            agent_exhausted = true;
            tracing::warn!(agent = %agent_name, reason = %reason, "agent exhausted, removed from pool");
        }

        let counter_outcome = handle_status(
            state,
            current_index as i64,
            iteration_result.status,
            &iteration_result.files_changed,
            current_hash.as_deref(),
        );
        *state = counter_outcome.state;
        write_multi_state(state, root)?;
        write_done_count(counter_outcome.current_spec_done_count, root)?;

        if let Some(cb) = on_iteration_end.as_deref_mut() {
            cb(
                *iteration,
                &iteration_result,
                counter_outcome.current_spec_done_count,
                &agent_name,
                &current_spec_progress.path,
            );
        }

        if agent_exhausted && pool.is_empty() {
            return Ok(LoopResult {
                exit_code: 4,
                message: "All agents exhausted".to_string(),
                iterations_run: *iterations_run,
            });
        }

        match counter_outcome.action {
            Action::Exit(0) => {
                return Ok(LoopResult {
                    exit_code: 0,
                    message: "Goal achieved!".to_string(),
                    iterations_run: *iterations_run,
                })
            }
            Action::Exit(2) => {
                return Ok(LoopResult {
                    exit_code: 2,
                    message: "Ralph needs help. Check .ralph/handoffs/".to_string(),
                    iterations_run: *iterations_run,
                })
            }
            Action::Exit(code) => {
                return Ok(LoopResult {
                    exit_code: if code == 0 { 1 } else { code },
                    message: "Unknown error".to_string(),
                    iterations_run: *iterations_run,
                })
            }
            Action::Continue => {}
        }

        if !state.specs.is_empty() {
            let previous_paths: HashSet<String> =
                state.specs.iter().map(|s| s.path.clone()).collect();
            let new_specs = discover_specs(root.as_std_path())?;
            if new_specs.is_empty() {
                return Ok(LoopResult {
                    exit_code: 1,
                    message: "No spec files found".to_string(),
                    iterations_run: *iterations_run,
                });
            }
            let new_spec_paths: Vec<String> =
                new_specs.iter().map(|s| s.rel_posix.clone()).collect();
            *state = ensure_state(&new_spec_paths, root)?;

            let priority_input: Vec<(String, Option<String>)> = new_specs
                .iter()
                .map(|s| (s.rel_posix.clone(), spec_content_hash(&s.path)))
                .collect();
            let sorted_paths = sort_by_priority(&priority_input, state);
            let discovered: HashSet<String> =
                new_specs.iter().map(|s| s.rel_posix.clone()).collect();
            let added_paths: Vec<String> = discovered.difference(&previous_paths).cloned().collect();

            let next_index = select_next_index(
                &sorted_paths,
                state,
                state.current_index as usize,
                iteration_result.status,
                !iteration_result.files_changed.is_empty(),
                &added_paths,
            );
            state.current_index = next_index as i64;
            write_multi_state(state, root)?;
        }
    }

    Ok(LoopResult {
        exit_code: 3,
        message: format!("Max iterations reached ({})", options.max_iterations),
        iterations_run: *iterations_run,
    })
}
