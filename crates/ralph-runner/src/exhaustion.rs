//! Provider-specific exhaustion-signature classification.
//!
//! Two concrete providers, two unrelated signature shapes: Claude signals
//! exhaustion on stdout with a literal epoch-bearing marker; Codex signals it
//! on stderr, but only inside the "runtime-error region" — the suffix of
//! stderr that comes after the assistant's own echoed-prompt banner, so a
//! spec that merely *mentions* "usage limit" in its text can't false-positive
//! the detector.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExhaustionInfo {
    pub reason: String,
}

fn claude_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Claude AI usage limit reached\|(\d+)").unwrap())
}

/// Claude: exhausted iff the process exited non-zero and stdout contains,
/// on its own line, `Claude AI usage limit reached|<unix_epoch_seconds>`. A
/// successful exit is never exhaustion, even if the marker is present.
pub fn claude_exhaustion(exit_code: i32, stdout: &str) -> Option<ExhaustionInfo> {
    if exit_code == 0 {
        return None;
    }
    let captures = claude_pattern().captures(stdout)?;
    let epoch: i64 = captures.get(1)?.as_str().parse().ok()?;
    let reset_at = DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string());
    let reason = match reset_at {
        Some(when) => format!("usage limit reached (resets at {when})"),
        None => "usage limit reached".to_string(),
    };
    Some(ExhaustionInfo { reason })
}

fn user_block_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^user\s*$").unwrap())
}

fn mcp_startup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^mcp startup:").unwrap())
}

fn error_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\d{4}-\d{2}-\d{2}T\S*\bERROR\b").unwrap())
}

fn error_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^ERROR:").unwrap())
}

/// The suffix of `stderr` in which exhaustion/error markers are trusted:
/// after the echoed user-prompt block (if any), starting at the earliest of
/// the three runtime-error anchors. Empty if no anchor is found.
fn runtime_error_region(stderr: &str) -> &str {
    let search_start = match user_block_start_re().find(stderr) {
        Some(user_match) => match mcp_startup_re().find_at(stderr, user_match.end()) {
            Some(mcp_match) => mcp_match.end(),
            None => user_match.end(),
        },
        None => 0,
    };

    let tail = &stderr[search_start..];

    let mut earliest: Option<usize> = None;
    if let Some(pos) = tail.find("codex_api::endpoint::responses") {
        earliest = Some(earliest.map_or(pos, |e: usize| e.min(pos)));
    }
    if let Some(m) = error_timestamp_re().find(tail) {
        earliest = Some(earliest.map_or(m.start(), |e| e.min(m.start())));
    }
    if let Some(m) = error_line_re().find(tail) {
        earliest = Some(earliest.map_or(m.start(), |e| e.min(m.start())));
    }

    match earliest {
        Some(pos) => &tail[pos..],
        None => "",
    }
}

const EXHAUSTION_LITERALS: &[&str] = &[
    "usage_limit_reached",
    "429 Too Many Requests",
    "You've hit your usage limit",
];

fn resets_in_seconds_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"resets_in_seconds:\s*(\d+)").unwrap())
}

/// Render a second count as a coarse human duration, e.g. "33 minutes" or
/// "1 hour 5 minutes".
fn coarse_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    match (hours, minutes) {
        (0, m) => format!("{m} minute{}", if m == 1 { "" } else { "s" }),
        (h, 0) => format!("{h} hour{}", if h == 1 { "" } else { "s" }),
        (h, m) => format!(
            "{h} hour{} {m} minute{}",
            if h == 1 { "" } else { "s" },
            if m == 1 { "" } else { "s" }
        ),
    }
}

/// Codex: exhausted iff the process exited non-zero and the runtime-error
/// region of stderr contains one of three literal patterns. Content in the
/// echoed user-prompt block never triggers detection.
pub fn codex_exhaustion(exit_code: i32, stderr: &str) -> Option<ExhaustionInfo> {
    if exit_code == 0 {
        return None;
    }

    let region = runtime_error_region(stderr);
    if region.is_empty() {
        return None;
    }

    let matched = EXHAUSTION_LITERALS.iter().any(|lit| region.contains(lit));
    if !matched {
        return None;
    }

    let reason = match resets_in_seconds_re()
        .captures(region)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
    {
        Some(secs) => format!("usage limit reached (resets in {})", coarse_duration(secs)),
        None => "usage limit reached".to_string(),
    };

    Some(ExhaustionInfo { reason })
}
