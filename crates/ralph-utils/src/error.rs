use thiserror::Error;

/// Shared library error type returned by ralph's core crates.
///
/// Library code returns `RalphError` and never calls `std::process::exit`;
/// only the CLI boundary maps an error to an exit code via
/// [`crate::exit_codes::ExitCode`].
#[derive(Error, Debug)]
pub enum RalphError {
    #[error("spec error: {0}")]
    Spec(#[from] SpecError),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum SpecError {
    #[error("no specs discovered under {root}")]
    NoSpecsFound { root: String },

    #[error("failed to read spec at {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("failed to read state file at {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse state file at {path}: {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write state file at {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("current_index {index} out of range for {count} specs")]
    IndexOutOfRange { index: usize, count: usize },
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("{agent} CLI not found in PATH")]
    NotFound { agent: String },

    #[error("{agent} invocation timed out after {timeout_secs}s")]
    TimedOut { agent: String, timeout_secs: u64 },

    #[error("failed to spawn {agent}: {source}")]
    SpawnFailed {
        agent: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to capture subprocess output streams for {agent}")]
    StreamCaptureFailed { agent: String },
}

/// Errors that carry a user-facing message, context, and actionable suggestions.
///
/// Implemented for the leaf error enums so the CLI boundary can render a
/// consistent, helpful message regardless of which layer produced the error.
pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn context(&self) -> Option<String> {
        None
    }
    fn suggestions(&self) -> Vec<String> {
        Vec::new()
    }
}

impl UserFriendlyError for RunnerError {
    fn user_message(&self) -> String {
        match self {
            RunnerError::NotFound { agent } => format!("{agent} CLI is not installed or not on PATH"),
            RunnerError::TimedOut { agent, timeout_secs } => {
                format!("{agent} did not finish within {timeout_secs}s")
            }
            RunnerError::SpawnFailed { agent, .. } => format!("could not start {agent}"),
            RunnerError::StreamCaptureFailed { agent } => {
                format!("could not capture output from {agent}")
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            RunnerError::NotFound { agent } => {
                vec![format!("install the {agent} CLI and ensure it is on PATH")]
            }
            RunnerError::TimedOut { .. } => {
                vec!["increase --timeout-secs or break the spec into smaller steps".to_string()]
            }
            _ => Vec::new(),
        }
    }
}

impl UserFriendlyError for StateError {
    fn user_message(&self) -> String {
        match self {
            StateError::ReadFailed { path, .. } => format!("could not read state at {path}"),
            StateError::ParseFailed { path, .. } => format!("state file at {path} is corrupt"),
            StateError::WriteFailed { path, .. } => format!("could not write state at {path}"),
            StateError::IndexOutOfRange { .. } => "internal state index is invalid".to_string(),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            StateError::ParseFailed { path, .. } => {
                vec![format!("run `ralph reset` to discard {path} and start fresh")]
            }
            _ => Vec::new(),
        }
    }
}
