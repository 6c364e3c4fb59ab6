//! Tracing library adapter implementation.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// Logger implementation that delegates to the `tracing` crate.
///
/// The category is emitted as a `category` field so subscribers can filter on
/// it alongside the event level.
///
/// ```ignore
/// use tilecache::log::{Logger, TracingLogger};
/// use std::sync::Arc;
///
/// // Assumes a tracing subscriber is already installed
/// let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
/// logger.info("cache", format_args!("Using tracing backend"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// Create a new tracing logger adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, category: &str, args: Arguments<'_>) {
        match level {
            LogLevel::Trace => tracing::trace!(category, "{}", args),
            LogLevel::Debug => tracing::debug!(category, "{}", args),
            LogLevel::Info => tracing::info!(category, "{}", args),
            LogLevel::Warn => tracing::warn!(category, "{}", args),
            LogLevel::Error => tracing::error!(category, "{}", args),
        }
    }
}
