//! Command-line interface for the ralph driver.
//!
//! - `args`: CLI argument definitions and parsing structures (clap)
//! - `commands`: one `execute_*` function per subcommand
//! - `run`: argument parsing, logging init, and dispatch

mod commands;
mod run;

pub mod args;

pub use args::{Cli, Commands};
pub use run::run;
