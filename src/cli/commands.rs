//! CLI command implementations.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use ralph_agent::{known_agents, AgentPool};
use ralph_engine::{run_loop, LoopOptions};
use ralph_ignore::IgnoreSpec;
use ralph_state::{
    paths::{guardrails_path, ralph_dir, run_state_path},
    read_multi_state, write_multi_state, RunState, Status,
};
use ralph_utils::exit_codes::ExitCode;
use std::time::Duration;

use crate::config::{CliOverrides, RalphConfig};

fn workspace_root(root: Option<std::path::PathBuf>) -> Result<Utf8PathBuf> {
    let root = root.unwrap_or_else(|| std::path::PathBuf::from("."));
    Utf8PathBuf::from_path_buf(root).map_err(|p| anyhow::anyhow!("non-UTF-8 root path: {}", p.display()))
}

pub fn execute_run(
    root: Option<std::path::PathBuf>,
    max_iterations: Option<i64>,
    timeout_secs: Option<u64>,
    test_cmd: Option<String>,
    agents: Vec<String>,
) -> Result<ExitCode> {
    let root = workspace_root(root)?;
    let overrides = CliOverrides {
        max_iterations,
        timeout_secs,
        test_cmd,
        agents: if agents.is_empty() { None } else { Some(agents) },
    };
    let config = RalphConfig::discover(root.as_std_path(), &overrides)
        .context("failed to load ralph configuration")?;

    let ignorefile_content = std::fs::read_to_string(root.join(".ralphignore")).ok();
    let ignore = IgnoreSpec::new(ignorefile_content.as_deref())
        .context("failed to compile .ralphignore patterns")?;

    let mut candidates: Vec<_> = known_agents()
        .into_iter()
        .filter(|agent| {
            config
                .agents
                .iter()
                .any(|name| name.eq_ignore_ascii_case(agent.name()))
        })
        .collect();
    candidates.sort_by_key(|agent| {
        config
            .agents
            .iter()
            .position(|name| name.eq_ignore_ascii_case(agent.name()))
            .unwrap_or(usize::MAX)
    });
    let mut pool = AgentPool::discover(candidates);

    if pool.is_empty() {
        eprintln!("no configured agent CLI is available on PATH");
        return Ok(ExitCode::POOL_EXHAUSTED);
    }

    let options = LoopOptions {
        max_iterations: config.max_iterations,
        test_cmd: config.test_cmd.clone(),
        timeout: if config.timeout_secs == 0 {
            Duration::from_secs(u64::MAX / 2)
        } else {
            Duration::from_secs(config.timeout_secs)
        },
    };

    let mut on_start = |iteration: i64, max: i64, done_count: i64, agent: &str, spec: &str| {
        tracing::info!(iteration, max, done_count, agent, spec, "starting iteration");
    };
    let mut on_end = |iteration: i64,
                      result: &ralph_engine::IterationResult,
                      done_count: i64,
                      agent: &str,
                      spec: &str| {
        tracing::info!(
            iteration,
            status = %result.status,
            done_count,
            agent,
            spec,
            files_changed = result.files_changed.len(),
            "finished iteration"
        );
    };

    let result = run_loop(
        &root,
        &options,
        &ignore,
        &mut pool,
        Some(&mut on_start),
        Some(&mut on_end),
    )?;

    println!("{}", result.message);
    Ok(match result.exit_code {
        0 => ExitCode::SUCCESS,
        1 => ExitCode::NO_SPECS,
        2 => ExitCode::STUCK,
        4 => ExitCode::POOL_EXHAUSTED,
        _ => ExitCode::ITERATION_CEILING,
    })
}

pub fn execute_init(root: Option<std::path::PathBuf>) -> Result<ExitCode> {
    let root = workspace_root(root)?;
    let dir = ralph_dir(&root);
    std::fs::create_dir_all(dir.join("specs")).context("failed to create .ralph/specs")?;
    std::fs::create_dir_all(dir.join("history")).context("failed to create .ralph/history")?;
    std::fs::create_dir_all(dir.join("handoffs")).context("failed to create .ralph/handoffs")?;

    let guardrails = guardrails_path(&root);
    if !guardrails.exists() {
        std::fs::write(&guardrails, ralph_state::templates::GUARDRAILS_TEMPLATE)
            .context("failed to write guardrails.md")?;
    }

    let has_prompt_file = root.join("PROMPT.md").exists();
    let has_any_spec = std::fs::read_dir(root.as_std_path())
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                e.file_name()
                    .to_string_lossy()
                    .ends_with(".spec.md")
            })
        })
        .unwrap_or(false);

    if !has_prompt_file && !has_any_spec {
        std::fs::write(root.join("PROMPT.md"), ralph_state::templates::PROMPT_TEMPLATE)
            .context("failed to write starter PROMPT.md")?;
        println!("Wrote starter PROMPT.md");
    }

    println!("Initialized ralph workspace at {root}");
    Ok(ExitCode::SUCCESS)
}

pub fn execute_status(root: Option<std::path::PathBuf>, json: bool) -> Result<ExitCode> {
    let root = workspace_root(root)?;
    let state = read_multi_state(&root);
    let run_state = std::fs::read_to_string(run_state_path(&root).as_std_path())
        .ok()
        .and_then(|text| serde_json::from_str::<RunState>(&text).ok());

    if json {
        let payload = serde_json::json!({
            "state": state,
            "live_run": run_state,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(ExitCode::SUCCESS);
    }

    match state {
        None => println!("No state recorded yet; run `ralph init` then `ralph run`."),
        Some(state) => {
            println!("iteration: {}", state.iteration);
            println!("status: {}", state.status);
            println!("current_index: {}", state.current_index);
            for (index, spec) in state.specs.iter().enumerate() {
                let marker = if index as i64 == state.current_index { "*" } else { " " };
                println!(
                    "{marker} [{}/3] {} ({})",
                    spec.done_count,
                    spec.path,
                    spec.last_status.as_deref().unwrap_or("none")
                );
            }
        }
    }

    match run_state {
        Some(run_state) => println!(
            "live run: pid {} iteration {}/{} agent {}",
            run_state.pid, run_state.iteration, run_state.max_iterations, run_state.agent_name
        ),
        None => println!("no run currently live"),
    }

    Ok(ExitCode::SUCCESS)
}

pub fn execute_reset(root: Option<std::path::PathBuf>, hard: bool, yes: bool) -> Result<ExitCode> {
    let root = workspace_root(root)?;

    if !yes {
        use std::io::Write;
        print!(
            "This will reset {}'s progress{}. Continue? [y/N] ",
            root,
            if hard { " and delete history/handoffs" } else { "" }
        );
        std::io::stdout().flush().ok();
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer).ok();
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Aborted.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    if let Some(mut state) = read_multi_state(&root) {
        state.iteration = 0;
        state.status = Status::Idle;
        state.current_index = 0;
        for spec in &mut state.specs {
            spec.done_count = 0;
            spec.last_status = None;
            spec.last_hash = None;
            spec.modified_files = false;
        }
        write_multi_state(&state, &root)?;
    }

    if hard {
        let dir = ralph_dir(&root);
        let _ = std::fs::remove_dir_all(dir.join("history"));
        let _ = std::fs::remove_dir_all(dir.join("handoffs"));
        std::fs::create_dir_all(dir.join("history")).ok();
        std::fs::create_dir_all(dir.join("handoffs")).ok();
    }

    println!("Workspace reset.");
    Ok(ExitCode::SUCCESS)
}
