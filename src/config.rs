//! `RalphConfig` discovery: CLI flags override `.ralph/config.toml`, which
//! overrides built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_MAX_ITERATIONS: i64 = 20;
const DEFAULT_TIMEOUT_SECS: u64 = 10_800;
const CONFIG_FILE_NAME: &str = "config.toml";

/// Effective configuration for one `ralph run` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RalphConfig {
    pub max_iterations: i64,
    pub timeout_secs: u64,
    pub test_cmd: Option<String>,
    pub agents: Vec<String>,
}

impl Default for RalphConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            test_cmd: None,
            agents: vec!["claude".to_string(), "codex".to_string()],
        }
    }
}

/// CLI-supplied overrides, all optional; anything left `None` falls through
/// to the config file, then to [`RalphConfig::default`].
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub max_iterations: Option<i64>,
    pub timeout_secs: Option<u64>,
    pub test_cmd: Option<String>,
    pub agents: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    max_iterations: Option<i64>,
    timeout_secs: Option<u64>,
    test_cmd: Option<String>,
    agents: Option<Vec<String>>,
}

impl RalphConfig {
    pub fn discover(root: &Path, overrides: &CliOverrides) -> anyhow::Result<Self> {
        let config_path = discover_config_file(root);
        let file_config = match config_path {
            Some(path) => load_config_file(&path)?,
            None => TomlConfig::default(),
        };

        let mut config = RalphConfig::default();
        if let Some(max_iterations) = file_config.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(timeout_secs) = file_config.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if let Some(test_cmd) = file_config.test_cmd {
            config.test_cmd = Some(test_cmd);
        }
        if let Some(agents) = file_config.agents {
            config.agents = agents;
        }

        if let Some(max_iterations) = overrides.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if overrides.test_cmd.is_some() {
            config.test_cmd = overrides.test_cmd.clone();
        }
        if let Some(agents) = overrides.agents.clone() {
            config.agents = agents;
        }

        Ok(config)
    }
}

/// Walk upward from `root` looking for `.ralph/config.toml`, stopping at a
/// VCS boundary if no config was found first.
fn discover_config_file(root: &Path) -> Option<PathBuf> {
    let mut current = root.to_path_buf();
    loop {
        let candidate = current.join(".ralph").join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if current.join(".git").exists() || current.parent().is_none() {
            return None;
        }
        current = current.parent()?.to_path_buf();
    }
}

fn load_config_file(path: &Path) -> anyhow::Result<TomlConfig> {
    use anyhow::Context;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_config_file_or_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = RalphConfig::discover(dir.path(), &CliOverrides::default()).unwrap();
        assert_eq!(config, RalphConfig::default());
    }

    #[test]
    fn config_file_overrides_defaults_and_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".ralph")).unwrap();
        std::fs::write(
            dir.path().join(".ralph").join("config.toml"),
            "max_iterations = 5\ntest_cmd = \"cargo test\"\n",
        )
        .unwrap();

        let config = RalphConfig::discover(dir.path(), &CliOverrides::default()).unwrap();
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.test_cmd.as_deref(), Some("cargo test"));

        let overrides = CliOverrides {
            max_iterations: Some(99),
            ..Default::default()
        };
        let config = RalphConfig::discover(dir.path(), &overrides).unwrap();
        assert_eq!(config.max_iterations, 99);
        assert_eq!(config.test_cmd.as_deref(), Some("cargo test"));
    }
}
