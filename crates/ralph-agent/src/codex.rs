use crate::Agent;
use ralph_runner::{codex_exhaustion, ExhaustionInfo, ProcessOutput};
use ralph_utils::error::RunnerError;
use std::path::Path;
use std::time::Duration;

/// Drives the `codex` CLI in non-interactive `exec` mode.
pub struct CodexAgent;

impl CodexAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CodexAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for CodexAgent {
    fn name(&self) -> &str {
        "Codex"
    }

    fn is_available(&self) -> bool {
        which::which("codex").is_ok()
    }

    fn invoke(
        &self,
        prompt: &str,
        timeout: Duration,
        tee_path: Option<&Path>,
    ) -> Result<ProcessOutput, RunnerError> {
        let codex_path = which::which("codex").map_err(|_| RunnerError::NotFound {
            agent: self.name().to_string(),
        })?;
        let cwd = std::env::current_dir().map_err(|source| RunnerError::SpawnFailed {
            agent: self.name().to_string(),
            source,
        })?;

        let argv = vec![
            codex_path.to_string_lossy().into_owned(),
            "exec".to_string(),
            "-C".to_string(),
            cwd.to_string_lossy().into_owned(),
            "--skip-git-repo-check".to_string(),
            "--dangerously-bypass-approvals-and-sandbox".to_string(),
            prompt.to_string(),
        ];

        ralph_runner::invoke(self.name(), &argv, timeout, tee_path)
    }

    fn exhaustion(&self, output: &ProcessOutput) -> Option<ExhaustionInfo> {
        codex_exhaustion(output.exit_code, &output.stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_codex() {
        assert_eq!(CodexAgent::new().name(), "Codex");
    }
}
