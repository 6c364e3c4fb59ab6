//! Configuration and error types for the bounded disk cache.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Default upper bound: eviction starts above 2 GiB.
pub const DEFAULT_UPPER_LIMIT_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Default lower bound: eviction stops at or below 1.5 GiB.
pub const DEFAULT_LOWER_LIMIT_BYTES: u64 = 1536 * 1024 * 1024;

/// Default interval between scheduled sweeps (10 minutes).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Cache-related errors.
///
/// Only construction and explicit, caller-driven operations surface these.
/// Scheduled sweeps log their failures instead of returning them.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error during cache operations
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid cache configuration
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    /// Cache root exists but cannot be written to
    #[error("Cache directory {path} is not writable: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Background maintenance thread could not be started
    #[error("Failed to start cache maintenance: {0}")]
    Maintenance(std::io::Error),
}

/// Configuration for a [`BoundedDiskCache`](super::BoundedDiskCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskCacheConfig {
    /// Cache directory root, exclusively managed by one cache instance
    pub cache_dir: PathBuf,
    /// Eviction starts once the tree holds more than this many bytes
    pub upper_limit_bytes: u64,
    /// Eviction stops once the tree holds at most this many bytes
    pub lower_limit_bytes: u64,
    /// Time between scheduled sweeps
    pub sweep_interval: Duration,
    /// Origin of the sweep phase grid (see [`crate::time::phase_aligned_delay`])
    pub sweep_reference: SystemTime,
}

impl Default for DiskCacheConfig {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tilecache");

        Self {
            cache_dir,
            upper_limit_bytes: DEFAULT_UPPER_LIMIT_BYTES,
            lower_limit_bytes: DEFAULT_LOWER_LIMIT_BYTES,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            sweep_reference: SystemTime::UNIX_EPOCH,
        }
    }
}

impl DiskCacheConfig {
    /// Create a configuration for `cache_dir` with default limits.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Default::default()
        }
    }

    /// Set both eviction bounds.
    pub fn with_limits(mut self, upper_bytes: u64, lower_bytes: u64) -> Self {
        self.upper_limit_bytes = upper_bytes;
        self.lower_limit_bytes = lower_bytes;
        self
    }

    /// Set the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the origin of the sweep phase grid.
    pub fn with_sweep_reference(mut self, reference: SystemTime) -> Self {
        self.sweep_reference = reference;
        self
    }

    /// Check the configuration invariants.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(CacheError::InvalidConfig(
                "cache directory must not be empty".to_string(),
            ));
        }
        if self.upper_limit_bytes < self.lower_limit_bytes {
            return Err(CacheError::InvalidConfig(format!(
                "upper limit ({} bytes) is below lower limit ({} bytes)",
                self.upper_limit_bytes, self.lower_limit_bytes
            )));
        }
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
