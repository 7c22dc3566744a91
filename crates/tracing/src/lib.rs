//! Utilities for setting up tracing at the CLI's entry point.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initializes a stderr tracing subscriber honoring `RUST_LOG`, defaulting to
/// `warn` when the variable is unset or unparsable.
///
/// Returns nothing to keep, since stderr is written synchronously; use
/// [`init_file`] when the caller wants a background writer thread instead.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initializes tracing to append to a log file under `dir`, rotating daily.
///
/// The returned [`WorkerGuard`] must be held for the process's lifetime:
/// dropping it flushes and stops the background writer thread.
pub fn init_file(dir: impl Into<PathBuf>, file_name_prefix: &str) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(dir.into(), file_name_prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    guard
}
