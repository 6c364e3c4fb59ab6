//! Default values for configuration settings.

use std::path::PathBuf;
use std::time::Duration;

use super::file::config_directory;
use super::settings::*;
use crate::cache::{DEFAULT_LOWER_LIMIT_BYTES, DEFAULT_SWEEP_INTERVAL, DEFAULT_UPPER_LIMIT_BYTES};
use crate::download::DEFAULT_MAX_CONCURRENT_DOWNLOADS;
use crate::locator::DEFAULT_RETRY_BACKOFF;

/// Upper bound on `[download] max_concurrent`.
pub const MAX_DOWNLOAD_CONCURRENT: usize = 256;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "tilecache.log";

/// Default cache root (platform cache directory + `tilecache`).
pub fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tilecache")
}

/// Clamps download concurrency to `1..=MAX_DOWNLOAD_CONCURRENT`, warning when
/// the value changes.
pub(super) fn clamp_download_concurrent(value: usize) -> usize {
    let clamped = value.clamp(1, MAX_DOWNLOAD_CONCURRENT);
    if clamped != value {
        tracing::warn!(
            requested = value,
            max = MAX_DOWNLOAD_CONCURRENT,
            "download.max_concurrent out of range, clamping to {}",
            clamped
        );
    }
    clamped
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            upper_limit: DEFAULT_UPPER_LIMIT_BYTES,
            lower_limit: DEFAULT_LOWER_LIMIT_BYTES,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            sweep_reference: 0,
        }
    }
}

impl Default for TilesSettings {
    fn default() -> Self {
        Self {
            authored_directory: None,
            placeholder: None,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT_DOWNLOADS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: config_directory().join(DEFAULT_LOG_FILE_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.cache.upper_limit, 2 * 1024 * 1024 * 1024);
        assert_eq!(config.cache.lower_limit, 1536 * 1024 * 1024);
        assert_eq!(config.cache.sweep_interval, Duration::from_secs(600));
        assert_eq!(config.cache.sweep_reference, 0);
        assert!(config.tiles.authored_directory.is_none());
        assert_eq!(config.tiles.retry_backoff, Duration::from_secs(86_400));
        assert_eq!(config.download.max_concurrent, DEFAULT_MAX_CONCURRENT_DOWNLOADS);
        assert!(config.logging.file.ends_with(DEFAULT_LOG_FILE_NAME));
        assert!(config.tile_sets.is_empty());
    }

    #[test]
    fn test_clamp_download_concurrent() {
        assert_eq!(clamp_download_concurrent(0), 1);
        assert_eq!(clamp_download_concurrent(16), 16);
        assert_eq!(clamp_download_concurrent(10_000), MAX_DOWNLOAD_CONCURRENT);
    }
}
