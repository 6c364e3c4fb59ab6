//! Logger trait definition.

use std::fmt::{self, Arguments};

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Verbose debugging information
    Trace,
    /// Debugging information
    Debug,
    /// General information
    Info,
    /// Warning messages
    Warn,
    /// Error messages
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Logging sink for cache and locator components.
///
/// Implementations must be `Send + Sync` so a single sink can be shared by the
/// maintenance thread and every thread that resolves tiles.
pub trait Logger: Send + Sync {
    /// Write a message at the given level under a category.
    fn log(&self, level: LogLevel, category: &str, args: Arguments<'_>);

    /// Log a trace-level message.
    fn trace(&self, category: &str, args: Arguments<'_>) {
        self.log(LogLevel::Trace, category, args);
    }

    /// Log a debug-level message.
    fn debug(&self, category: &str, args: Arguments<'_>) {
        self.log(LogLevel::Debug, category, args);
    }

    /// Log an info-level message.
    fn info(&self, category: &str, args: Arguments<'_>) {
        self.log(LogLevel::Info, category, args);
    }

    /// Log a warning-level message.
    fn warn(&self, category: &str, args: Arguments<'_>) {
        self.log(LogLevel::Warn, category, args);
    }

    /// Log an error-level message.
    fn error(&self, category: &str, args: Arguments<'_>) {
        self.log(LogLevel::Error, category, args);
    }
}

/// Convenience macros taking `(logger, category, format, args...)`.
#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $category:expr, $($arg:tt)*) => {
        $logger.trace($category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $category:expr, $($arg:tt)*) => {
        $logger.debug($category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $category:expr, $($arg:tt)*) => {
        $logger.info($category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $category:expr, $($arg:tt)*) => {
        $logger.warn($category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $category:expr, $($arg:tt)*) => {
        $logger.error($category, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct CapturingLogger {
        lines: Mutex<Vec<(LogLevel, String, String)>>,
    }

    impl Logger for CapturingLogger {
        fn log(&self, level: LogLevel, category: &str, args: Arguments<'_>) {
            self.lines
                .lock()
                .push((level, category.to_string(), args.to_string()));
        }
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
        assert_eq!(LogLevel::Trace.to_string(), "TRACE");
    }

    #[test]
    fn test_helpers_route_through_log() {
        let logger = CapturingLogger::default();
        logger.info("cache", format_args!("hello {}", 1));
        logger.error("locator", format_args!("boom"));

        let lines = logger.lines.lock();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            (LogLevel::Info, "cache".to_string(), "hello 1".to_string())
        );
        assert_eq!(lines[1].0, LogLevel::Error);
        assert_eq!(lines[1].1, "locator");
    }

    #[test]
    fn test_macros_format_arguments() {
        let logger = CapturingLogger::default();
        crate::log_warn!(logger, "cache", "{} files over {}", 3, "limit");
        crate::log_debug!(logger, "cache", "plain");

        let lines = logger.lines.lock();
        assert_eq!(lines[0].2, "3 files over limit");
        assert_eq!(lines[1].0, LogLevel::Debug);
    }
}
