//! The Agent Pool: a uniform interface over the concrete assistant CLIs
//! ralph can drive, plus the pool that tracks which ones remain usable for
//! the rest of a run.

mod claude;
mod codex;
mod pool;

pub use claude::ClaudeAgent;
pub use codex::CodexAgent;
pub use pool::AgentPool;

use ralph_runner::{ExhaustionInfo, ProcessOutput};
use ralph_utils::error::RunnerError;
use std::path::Path;
use std::time::Duration;

/// One AI-assistant CLI ralph knows how to drive.
pub trait Agent: Send + Sync {
    /// Human-readable name, used in logs, history entries, and handoff notes.
    fn name(&self) -> &str;

    /// Whether this agent's CLI is on `PATH` right now.
    fn is_available(&self) -> bool;

    /// Run one turn: spawn the CLI with `prompt`, streaming to `tee_path` if
    /// given, and enforce `timeout`.
    fn invoke(
        &self,
        prompt: &str,
        timeout: Duration,
        tee_path: Option<&Path>,
    ) -> Result<ProcessOutput, RunnerError>;

    /// Interpret a completed invocation's output for this agent's
    /// provider-specific exhaustion signature.
    fn exhaustion(&self, output: &ProcessOutput) -> Option<ExhaustionInfo>;
}

/// Build the default pool of every agent implementation ralph ships, in a
/// stable order. Callers filter to available agents via [`AgentPool::new`].
pub fn known_agents() -> Vec<Box<dyn Agent>> {
    vec![Box::new(ClaudeAgent::new()), Box::new(CodexAgent::new())]
}
