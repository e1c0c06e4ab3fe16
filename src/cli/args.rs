//! CLI argument definitions and parsing structures.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ralph - autonomous iterative-development loop driver for AI assistant CLIs
#[derive(Parser)]
#[command(name = "ralph")]
#[command(about = "Drives an AI assistant CLI against spec files until verification completes")]
#[command(long_about = r#"
ralph repeatedly invokes an assistant CLI (Claude, Codex, ...) against one or
more spec files, tracking per-spec verification progress until every spec has
been confirmed DONE three rotations in a row without further changes.

EXAMPLES:
  # Scaffold a new workspace
  ralph init

  # Run the loop to completion (the default when no subcommand is given)
  ralph run --max-iterations 30

  # Check progress without mutating anything
  ralph status --json

  # Start over
  ralph reset --hard --yes
"#)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Enable verbose, structured log output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the loop engine to completion or a terminal condition (default)
    Run {
        /// Maximum number of iterations before giving up
        #[arg(long)]
        max_iterations: Option<i64>,

        /// Per-invocation agent timeout in seconds (0 disables the timeout)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Shell command to run after each iteration; result is informational only
        #[arg(long)]
        test_cmd: Option<String>,

        /// Agent names to include in the pool, in priority order (repeatable)
        #[arg(long = "agent")]
        agents: Vec<String>,
    },

    /// Scaffold `.ralph/` (guardrails, specs/) and a starter PROMPT.md if needed
    Init,

    /// Print the current multi-spec state without mutating anything
    Status {
        /// Output as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Clear state.json and per-spec progress
    Reset {
        /// Also delete history logs and handoff notes
        #[arg(long)]
        hard: bool,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
