use crate::Agent;
use ralph_runner::{claude_exhaustion, ExhaustionInfo, ProcessOutput};
use ralph_utils::error::RunnerError;
use std::path::Path;
use std::time::Duration;

/// Drives the `claude` CLI in non-interactive mode.
pub struct ClaudeAgent;

impl ClaudeAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClaudeAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for ClaudeAgent {
    fn name(&self) -> &str {
        "Claude"
    }

    fn is_available(&self) -> bool {
        which::which("claude").is_ok()
    }

    fn invoke(
        &self,
        prompt: &str,
        timeout: Duration,
        tee_path: Option<&Path>,
    ) -> Result<ProcessOutput, RunnerError> {
        let claude_path = which::which("claude").map_err(|_| RunnerError::NotFound {
            agent: self.name().to_string(),
        })?;

        let argv = vec![
            claude_path.to_string_lossy().into_owned(),
            "-p".to_string(),
            prompt.to_string(),
            "--output-format".to_string(),
            "text".to_string(),
            "--dangerously-skip-permissions".to_string(),
        ];

        ralph_runner::invoke(self.name(), &argv, timeout, tee_path)
    }

    fn exhaustion(&self, output: &ProcessOutput) -> Option<ExhaustionInfo> {
        claude_exhaustion(output.exit_code, &output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_claude() {
        assert_eq!(ClaudeAgent::new().name(), "Claude");
    }
}
