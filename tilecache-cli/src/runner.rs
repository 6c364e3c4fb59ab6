//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and cache creation
//! to reduce duplication across command handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tilecache::cache::BoundedDiskCache;
use tilecache::config::{config_file_path, ConfigFile};
use tilecache::log::{Logger, TracingLogger};
use tilecache::logging::{init_logging, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Resolve the config path: the `--config` override or the default location.
pub fn config_path(override_path: Option<&Path>) -> PathBuf {
    override_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path)
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    _logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    logger: Arc<dyn Logger>,
}

impl CliRunner {
    /// Load config and initialize logging.
    ///
    /// `stdout` mirrors log output to the terminal; one-shot commands keep it
    /// off so their printed results stay readable.
    pub fn new(config_override: Option<&Path>, stdout: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load_from(&config_path(config_override))?;

        let logging_guard = init_logging(&config.logging.file, stdout)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            logger: Arc::new(TracingLogger),
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Logger handed to library components.
    pub fn logger(&self) -> Arc<dyn Logger> {
        Arc::clone(&self.logger)
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("tilecache v{}", tilecache::VERSION);
        info!("tilecache CLI: {} command", command);
    }

    /// Open the configured disk cache.
    pub fn open_cache(&self) -> Result<BoundedDiskCache, CliError> {
        let cache = BoundedDiskCache::new(self.config.disk_cache_config(), self.logger())?;
        Ok(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_override() {
        assert_eq!(
            config_path(Some(Path::new("/etc/tilecache.ini"))),
            PathBuf::from("/etc/tilecache.ini")
        );
        assert_eq!(config_path(None), config_file_path());
    }
}
