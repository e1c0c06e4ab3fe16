//! Crash detection: an agent invocation that produced no usable output, or
//! that exited non-zero without an exhaustion signature, is a crash rather
//! than a normal turn.

use crate::process::ProcessOutput;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashInfo {
    pub summary: String,
}

/// A crash is: entirely-whitespace stdout, or a non-zero exit code. When
/// both hold, the empty-output message takes precedence — an agent that
/// produced nothing told us less than one that at least exited loudly.
pub fn detect_crash(output: &ProcessOutput) -> Option<CrashInfo> {
    let empty_output = output.stdout.trim().is_empty();
    let nonzero_exit = output.exit_code != 0;

    if !empty_output && !nonzero_exit {
        return None;
    }

    let summary = if empty_output {
        "empty output from agent".to_string()
    } else {
        format!("non-zero exit code ({})", output.exit_code)
    };

    Some(CrashInfo { summary })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: &str, exit_code: i32) -> ProcessOutput {
        ProcessOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code,
            timed_out: false,
        }
    }

    #[test]
    fn clean_exit_with_output_is_not_a_crash() {
        assert!(detect_crash(&output("done", 0)).is_none());
    }

    #[test]
    fn empty_stdout_is_a_crash() {
        let info = detect_crash(&output("   \n", 0)).unwrap();
        assert_eq!(info.summary, "empty output from agent");
    }

    #[test]
    fn nonzero_exit_is_a_crash() {
        let info = detect_crash(&output("partial output", 1)).unwrap();
        assert_eq!(info.summary, "non-zero exit code (1)");
    }

    #[test]
    fn empty_output_message_wins_when_both_hold() {
        let info = detect_crash(&output("", 1)).unwrap();
        assert_eq!(info.summary, "empty output from agent");
    }
}
