//! Logging setup for tilecache hosts.
//!
//! Installs a global `tracing` subscriber with:
//! - a file writer (truncated at start-up, written off-thread)
//! - optional stdout output for interactive use
//! - level filtering from `RUST_LOG`, defaulting to `info`
//!
//! Library components never call this; they log through [`crate::log::Logger`]
//! or plain `tracing` macros and leave subscriber setup to the host.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize logging to `log_path`, and to stdout when `stdout` is set.
///
/// Creates the parent directory if needed and clears a previous log file.
///
/// # Errors
///
/// Returns an error if the log file cannot be prepared or a global
/// subscriber is already installed.
pub fn init_logging(log_path: &Path, stdout: bool) -> Result<LoggingGuard, io::Error> {
    let (log_dir, log_file) = split_log_path(log_path)?;

    fs::create_dir_all(log_dir)?;
    fs::write(log_path, "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stdout_layer = stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn split_log_path(log_path: &Path) -> Result<(&Path, &std::ffi::OsStr), io::Error> {
    let file = log_path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log path {} has no file name", log_path.display()),
        )
    })?;
    let dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((dir, file))
}
