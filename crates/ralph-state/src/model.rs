//! Durable state data types and their tolerant JSON (de)serialization.

use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use strum::{Display, EnumString};

pub const STATE_VERSION: i64 = 1;

/// Status signal written by the child assistant to `.ralph/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Idle,
    Continue,
    Rotate,
    Done,
    Stuck,
}

/// Parse a status string, mapping any unrecognised value to `CONTINUE`
/// (matching the on-disk status file's tolerant-read contract).
pub fn parse_status_or_continue(raw: &str) -> Status {
    Status::from_str(raw).unwrap_or(Status::Continue)
}

/// Per-spec verification progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecProgress {
    pub path: String,
    pub done_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_hash: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub modified_files: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl SpecProgress {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            done_count: 0,
            last_status: None,
            last_hash: None,
            modified_files: false,
        }
    }
}

/// The full durable record at `.ralph/state.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiSpecState {
    pub version: i64,
    pub iteration: i64,
    pub status: Status,
    pub current_index: i64,
    pub specs: Vec<SpecProgress>,
}

fn coerce_int(value: Option<&Value>, default: i64) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
        Some(Value::String(s)) => s.parse().unwrap_or(default),
        _ => default,
    }
}

fn spec_progress_from_value(value: &Value) -> Option<SpecProgress> {
    let obj = value.as_object()?;
    let path = obj.get("path")?.as_str()?.to_string();
    let done_count = coerce_int(obj.get("done_count"), 0);
    let last_status = obj
        .get("last_status")
        .and_then(Value::as_str)
        .map(str::to_string);
    let last_hash = obj
        .get("last_hash")
        .and_then(Value::as_str)
        .map(str::to_string);
    let modified_files = obj
        .get("modified_files")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Some(SpecProgress {
        path,
        done_count,
        last_status,
        last_hash,
        modified_files,
    })
}

/// Parse a `MultiSpecState` from raw JSON text, tolerating unknown fields,
/// missing optional fields, and stringly-typed integers — matching the
/// on-disk contract's lossy-read guarantee. Returns `None` if the JSON is
/// malformed or `specs` is present but not a list.
pub fn state_from_json(text: &str) -> Option<MultiSpecState> {
    let value: Value = serde_json::from_str(text).ok()?;
    let obj = value.as_object()?;

    let version = coerce_int(obj.get("version"), 0);
    let iteration = coerce_int(obj.get("iteration"), 0);
    let status_raw = obj
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("IDLE")
        .to_string();
    let status = parse_status_or_continue(&status_raw);
    let current_index = coerce_int(obj.get("current_index"), 0);

    let specs_value = obj.get("specs").cloned().unwrap_or(Value::Array(vec![]));
    let specs_list = specs_value.as_array()?;
    let specs = specs_list
        .iter()
        .filter_map(spec_progress_from_value)
        .collect();

    Some(MultiSpecState {
        version,
        iteration,
        status,
        current_index,
        specs,
    })
}

/// Ephemeral run-state sentinel written while the loop is executing.
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct RunState {
    pub pid: u32,
    pub started_at_iso: String,
    pub iteration: i64,
    pub max_iterations: i64,
    pub agent_name: String,
    pub agent_started_at_iso: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_case_insensitive_and_falls_back_to_continue() {
        assert_eq!(Status::from_str("done").unwrap(), Status::Done);
        assert_eq!(Status::from_str("DONE").unwrap(), Status::Done);
        assert_eq!(parse_status_or_continue("bogus"), Status::Continue);
    }

    #[test]
    fn state_round_trips_through_json() {
        let state = MultiSpecState {
            version: STATE_VERSION,
            iteration: 5,
            status: Status::Continue,
            current_index: 0,
            specs: vec![SpecProgress::new("PROMPT.md")],
        };
        let text = serde_json::to_string(&state).unwrap();
        let back = state_from_json(&text).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn tolerates_unknown_fields_and_stringly_typed_ints() {
        let text = r#"{"version":"1","iteration":"3","status":"done","current_index":0,"specs":[{"path":"a","done_count":"2","unexpected":true}]}"#;
        let state = state_from_json(text).unwrap();
        assert_eq!(state.version, 1);
        assert_eq!(state.iteration, 3);
        assert_eq!(state.status, Status::Done);
        assert_eq!(state.specs[0].done_count, 2);
    }
}
