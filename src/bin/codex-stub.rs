//! Stub Codex CLI for development testing.
//!
//! Mimics just enough of the real `codex exec -C <dir> ... <prompt>` contract
//! for the integration tests: it writes `.ralph/status` in the current
//! directory and exits according to `RALPH_STUB_SCENARIO` (default `success`).

use clap::{Arg, Command};

fn main() {
    let matches = Command::new("codex-stub")
        .arg(Arg::new("exec").required(false))
        .arg(Arg::new("cwd").short('C').value_name("DIR"))
        .arg(
            Arg::new("skip-git-repo-check")
                .long("skip-git-repo-check")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dangerously-bypass-approvals-and-sandbox")
                .long("dangerously-bypass-approvals-and-sandbox")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(Arg::new("prompt"))
        .get_matches();

    let _prompt = matches.get_one::<String>("prompt").cloned().unwrap_or_default();
    let scenario = std::env::var("RALPH_STUB_SCENARIO").unwrap_or_else(|_| "success".to_string());

    let status_path = std::path::Path::new(".ralph").join("status");
    let _ = std::fs::create_dir_all(".ralph");

    // Every real codex invocation echoes the user-prompt block before its own
    // runtime output; reproduce that shape so the exhaustion detector's
    // anchor logic exercises the same stderr layout it sees in production.
    let echoed_prompt_block = "user\n(prompt omitted)\nmcp startup: ok\n";

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
            eprint!("{echoed_prompt_block}");
            eprintln!("ERROR: unexpected internal failure");
            std::process::exit(1);
        }
        "empty-output" => {
            std::process::exit(0);
        }
        "exhausted" => {
            eprint!("{echoed_prompt_block}");
            eprintln!("2026-02-11T10:00:00Z ERROR usage_limit_reached");
            eprintln!("resets_in_seconds: 1980");
            std::process::exit(1);
        }
        other => {
            eprintln!("unknown scenario: {other}");
            std::process::exit(1);
        }
    }
}
