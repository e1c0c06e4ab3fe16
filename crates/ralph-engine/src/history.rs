//! Rendering one iteration's history log entry.

use ralph_state::Status;

const RULE: &str = "================================================================================";

/// Everything that might appear in one history entry. Optional fields render
/// their section only when present, matching the on-disk format's terse,
/// mostly-empty-by-default shape.
pub struct LogEntryInput<'a> {
    pub iteration: i64,
    pub timestamp_rfc3339: &'a str,
    pub agent_name: &'a str,
    pub prompt: &'a str,
    pub agent_output: &'a str,
    pub agent_error: Option<&'a str>,
    pub status: Status,
    pub files_changed: &'a [String],
    pub test_result: Option<&'a (i32, String)>,
    pub agent_exit_code: Option<i32>,
    pub crash_summary: Option<&'a str>,
}

/// Find the first non-blank line in `text`, trimmed. Used to surface a short
/// error excerpt without dumping a full stack trace into a note.
pub fn first_non_empty_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

pub fn format_log_entry(input: &LogEntryInput<'_>) -> String {
    let mut lines: Vec<String> = vec![
        RULE.to_string(),
        format!(
            "RALPH ROTATION {} [{}] - {}",
            input.iteration, input.agent_name, input.timestamp_rfc3339
        ),
        RULE.to_string(),
        String::new(),
        "--- PROMPT SENT ---".to_string(),
        input.prompt.to_string(),
        String::new(),
        "--- AGENT OUTPUT ---".to_string(),
        input.agent_output.to_string(),
    ];

    if let Some(error) = input.agent_error {
        if !error.is_empty() {
            lines.push(String::new());
            lines.push("--- AGENT ERROR ---".to_string());
            lines.push(error.to_string());
        }
    }

    if let Some(summary) = input.crash_summary {
        lines.push(String::new());
        lines.push("--- CRASH DETECTED ---".to_string());
        lines.push(format!("Summary: {summary}"));
        if let Some(exit_code) = input.agent_exit_code {
            lines.push(format!("Exit Code: {exit_code}"));
        }
        lines.push(format!("Output Bytes: {}", input.agent_output.len()));
    }

    lines.push(String::new());
    lines.push("--- STATUS ---".to_string());
    lines.push(format!("Signal: {}", input.status));
    lines.push(format!("Files Changed: {}", input.files_changed.len()));
    for f in input.files_changed {
        lines.push(format!("  - {f}"));
    }

    if let Some((exit_code, output)) = input.test_result {
        lines.push(String::new());
        lines.push("--- TEST COMMAND ---".to_string());
        lines.push(format!("Exit Code: {exit_code}"));
        lines.push("Output:".to_string());
        lines.push(output.clone());
    }

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_empty_line_skips_blank_lines() {
        assert_eq!(first_non_empty_line("\n\n  hello\nworld"), Some("hello"));
        assert_eq!(first_non_empty_line("   \n\n"), None);
    }

    #[test]
    fn renders_minimal_entry_without_optional_sections() {
        let entry = format_log_entry(&LogEntryInput {
            iteration: 1,
            timestamp_rfc3339: "2026-07-30T00:00:00+00:00",
            agent_name: "Claude",
            prompt: "do the thing",
            agent_output: "did it",
            agent_error: None,
            status: Status::Continue,
            files_changed: &[],
            test_result: None,
            agent_exit_code: None,
            crash_summary: None,
        });

        assert!(entry.contains("RALPH ROTATION 1 [Claude]"));
        assert!(entry.contains("Signal: CONTINUE"));
        assert!(entry.contains("Files Changed: 0"));
        assert!(!entry.contains("CRASH DETECTED"));
        assert!(!entry.contains("TEST COMMAND"));
    }

    #[test]
    fn renders_crash_and_test_sections_when_present() {
        let files = vec!["a.rs".to_string()];
        let test_result = (1, "failures: 1".to_string());
        let entry = format_log_entry(&LogEntryInput {
            iteration: 2,
            timestamp_rfc3339: "2026-07-30T00:05:00+00:00",
            agent_name: "Codex",
            prompt: "do the thing",
            agent_output: "",
            agent_error: Some("boom"),
            status: Status::Rotate,
            files_changed: &files,
            test_result: Some(&test_result),
            agent_exit_code: Some(1),
            crash_summary: Some("non-zero exit code (1)"),
        });

        assert!(entry.contains("--- AGENT ERROR ---"));
        assert!(entry.contains("boom"));
        assert!(entry.contains("CRASH DETECTED"));
        assert!(entry.contains("Exit Code: 1"));
        assert!(entry.contains("  - a.rs"));
        assert!(entry.contains("TEST COMMAND"));
        assert!(entry.contains("failures: 1"));
    }
}
