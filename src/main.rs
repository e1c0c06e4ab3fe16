//! ralph CLI binary.
//!
//! This is the minimal entrypoint; all logic lives in the library, and
//! `cli::run()` handles all output including errors.

fn main() {
    if let Err(code) = ralph::cli::run() {
        std::process::exit(code.as_i32());
    }
}
