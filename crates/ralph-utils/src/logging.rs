//! Structured logging setup for the ralph driver.

use std::io::IsTerminal;
use tracing::{Level, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Whether colored terminal output should be used: only when stdout is a
/// TTY and `NO_COLOR` is unset.
pub fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Initialize the global tracing subscriber.
///
/// `verbose` selects a structured format with target/span-close events;
/// otherwise a compact human-readable format is used. `RUST_LOG` always
/// takes precedence over the verbose default.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("ralph=debug,info")
            } else {
                EnvFilter::try_new("ralph=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let ansi = use_color();

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(fmt::format::FmtSpan::CLOSE)
                    .with_ansi(ansi)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_ansi(ansi)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span covering one full loop iteration, carrying iteration number, spec,
/// and selected agent for every log line emitted inside it.
pub fn iteration_span(iteration: u64, spec_path: &str, agent: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "iteration",
        iteration = %iteration,
        spec = %spec_path,
        agent = %agent,
    )
}
