//! No-operation logger implementation.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// A logger that discards all messages.
///
/// ```
/// use tilecache::log::{Logger, NoOpLogger};
/// use std::sync::Arc;
///
/// let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
/// logger.info("cache", format_args!("This message is discarded"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    #[inline]
    fn log(&self, _level: LogLevel, _category: &str, _args: Arguments<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_logger_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoOpLogger>();
    }

    #[test]
    fn test_noop_logger_as_trait_object() {
        let logger: Box<dyn Logger> = Box::new(NoOpLogger);
        logger.info("cache", format_args!("test message"));
        logger.error("locator", format_args!("error message"));
        logger.trace("cache", format_args!("trace message"));
    }
}
