//! CLI entry point and dispatch logic.
//!
//! `run()` handles all output including errors and returns `Result<(), ExitCode>`;
//! `main.rs` only maps the `Err` variant to a process exit code.

use clap::Parser;
use ralph_utils::exit_codes::ExitCode;

use super::args::{Cli, Commands};
use super::commands;

pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(err) = ralph_utils::logging::init_tracing(cli.verbose) {
        eprintln!("failed to initialize logging: {err}");
    }

    let outcome = match cli.command.unwrap_or(Commands::Run {
        max_iterations: None,
        timeout_secs: None,
        test_cmd: None,
        agents: Vec::new(),
    }) {
        Commands::Run {
            max_iterations,
            timeout_secs,
            test_cmd,
            agents,
        } => commands::execute_run(cli.root, max_iterations, timeout_secs, test_cmd, agents),
        Commands::Init => commands::execute_init(cli.root),
        Commands::Status { json } => commands::execute_status(cli.root, json),
        Commands::Reset { hard, yes } => commands::execute_reset(cli.root, hard, yes),
    };

    match outcome {
        Ok(code) => {
            if code == ExitCode::SUCCESS {
                Ok(())
            } else {
                Err(code)
            }
        }
        Err(err) => {
            eprintln!("ralph: {err:#}");
            Err(ExitCode::NO_SPECS)
        }
    }
}
