//! Stub Claude CLI for development testing.
//!
//! Mimics just enough of the real `claude -p <prompt> ...` contract for the
//! integration tests: it writes `.ralph/status` in the current directory and
//! exits according to `RALPH_STUB_SCENARIO` (default `success`).

use clap::{Arg, Command};

fn main() {
    let matches = Command::new("claude-stub")
        .arg(Arg::new("prompt-flag").short('p').value_name("PROMPT"))
        .arg(Arg::new("output-format").long("output-format").value_name("FORMAT"))
        .arg(
            Arg::new("dangerously-skip-permissions")
                .long("dangerously-skip-permissions")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let _prompt = matches.get_one::<String>("prompt-flag").cloned().unwrap_or_default();
    let scenario = std::env::var("RALPH_STUB_SCENARIO").unwrap_or_else(|_| "success".to_string());

    let status_path = std::path::Path::new(".ralph").join("status");
    let _ = std::fs::create_dir_all(".ralph");

    match scenario.as_str() {
        "continue" => {
            let _ = std::fs::write(&status_path, "CONTINUE\n");
            println!("Made progress, more work remains.");
        }
        "done" | "success" => {
            let _ = std::fs::write(&status_path, "DONE\n");
            println!("Verified, no changes needed.");
        }
        "stuck" => {
            let _ = std::fs::write(&status_path, "STUCK\n");
            println!("Cannot proceed without human input.");
        }
        "crash" => {
            eprintln!("panic: simulated crash");
            std::process::exit(1);
        }
        "empty-output" => {
            std::process::exit(0);
        }
        "exhausted" => {
            println!("Claude AI usage limit reached|1770843600");
            std::process::exit(1);
        }
        other => {
            eprintln!("unknown scenario: {other}");
            std::process::exit(1);
        }
    }
}
