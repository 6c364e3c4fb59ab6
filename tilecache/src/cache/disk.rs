//! Size-bounded disk cache with background eviction.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

use super::daemon::{MaintenanceDaemon, ShutdownSignal};
use super::eviction::{clear_directory, sweep_directory, ClearReport, SweepReport};
use super::stats::{CacheStats, CacheStatsSnapshot};
use super::types::{CacheError, DiskCacheConfig};
use super::walk::{directory_usage, CacheUsage};
use crate::log::Logger;
use crate::time::phase_aligned_delay;
use crate::{log_error, log_info};

const LOG_CATEGORY: &str = "cache";

/// Name of the file used to check the root is writable at construction.
const WRITE_PROBE_NAME: &str = ".tilecache-write-probe";

/// A directory tree kept within a byte budget.
///
/// The cache owns its root exclusively. It does not know what the files are:
/// it sees only paths, sizes and access times. Once the tree grows past the
/// upper bound a sweep deletes least-recently-accessed files until it is back
/// at or below the lower bound.
///
/// Sweeps run on demand via [`sweep`](Self::sweep) or on a background schedule
/// started with [`start_maintenance`](Self::start_maintenance). Dropping the
/// cache stops the schedule; cached files are left in place.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use tilecache::cache::{BoundedDiskCache, DiskCacheConfig};
/// use tilecache::log::TracingLogger;
///
/// let config = DiskCacheConfig::new("/var/cache/globe").with_limits(2 << 30, 3 << 29);
/// let cache = BoundedDiskCache::new(config, Arc::new(TracingLogger))?;
/// cache.start_maintenance()?;
/// ```
pub struct BoundedDiskCache {
    inner: Arc<CacheInner>,
    daemon: Mutex<Option<MaintenanceDaemon>>,
}

/// State shared with the maintenance thread.
pub(crate) struct CacheInner {
    config: DiskCacheConfig,
    logger: Arc<dyn Logger>,
    stats: CacheStats,
    #[cfg(test)]
    panic_next_sweep: std::sync::atomic::AtomicBool,
}

impl CacheInner {
    fn sweep(&self, should_stop: &dyn Fn() -> bool) -> Result<SweepReport, CacheError> {
        #[cfg(test)]
        if self
            .panic_next_sweep
            .swap(false, std::sync::atomic::Ordering::SeqCst)
        {
            panic!("injected sweep panic");
        }

        let report = sweep_directory(
            &self.config.cache_dir,
            self.config.upper_limit_bytes,
            self.config.lower_limit_bytes,
            should_stop,
        )?;

        self.stats.record_sweep(&report);
        if report.evicted {
            log_info!(
                self.logger,
                LOG_CATEGORY,
                "Evicted {} files ({} bytes) in {} ms, {} -> {} bytes",
                report.files_deleted,
                report.bytes_freed,
                report.duration.as_millis(),
                report.size_before,
                report.size_after
            );
        }
        Ok(report)
    }

    /// Run one sweep for the scheduler.
    ///
    /// Nothing escapes: errors and panics are logged and counted so the next
    /// scheduled sweep runs as usual.
    pub(crate) fn run_scheduled_sweep(&self, shutdown: &ShutdownSignal) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.sweep(&|| shutdown.is_cancelled())
        }));

        match outcome {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                self.stats.record_failure();
                log_error!(self.logger, LOG_CATEGORY, "Cache sweep failed: {}", e);
            }
            Err(payload) => {
                self.stats.record_failure();
                log_error!(
                    self.logger,
                    LOG_CATEGORY,
                    "Cache sweep panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

impl BoundedDiskCache {
    /// Create a cache over `config.cache_dir`.
    ///
    /// Creates the directory if needed and checks it can be written to.
    /// Invalid bounds and unusable directories fail here; nothing later in
    /// the cache's life is fatal.
    pub fn new(config: DiskCacheConfig, logger: Arc<dyn Logger>) -> Result<Self, CacheError> {
        config.validate()?;

        fs::create_dir_all(&config.cache_dir)?;
        probe_writable(&config.cache_dir)?;

        log_info!(
            logger,
            LOG_CATEGORY,
            "Disk cache at {} (upper {} bytes, lower {} bytes)",
            config.cache_dir.display(),
            config.upper_limit_bytes,
            config.lower_limit_bytes
        );

        Ok(Self {
            inner: Arc::new(CacheInner {
                config,
                logger,
                stats: CacheStats::new(),
                #[cfg(test)]
                panic_next_sweep: std::sync::atomic::AtomicBool::new(false),
            }),
            daemon: Mutex::new(None),
        })
    }

    /// Root directory managed by this cache.
    pub fn root(&self) -> &Path {
        &self.inner.config.cache_dir
    }

    /// Active configuration.
    pub fn config(&self) -> &DiskCacheConfig {
        &self.inner.config
    }

    /// Run one sweep now on the calling thread.
    pub fn sweep(&self) -> Result<SweepReport, CacheError> {
        self.inner.sweep(&|| false)
    }

    /// Start background sweeps on the configured interval, phase-aligned to
    /// the configured reference time.
    pub fn start_maintenance(&self) -> Result<(), CacheError> {
        let interval = self.inner.config.sweep_interval;
        let first_delay =
            phase_aligned_delay(SystemTime::now(), self.inner.config.sweep_reference, interval);
        self.start_maintenance_with(first_delay, interval)
    }

    /// Start background sweeps with an explicit first delay and interval.
    ///
    /// A schedule that is already running is stopped and joined first.
    pub fn start_maintenance_with(
        &self,
        first_delay: Duration,
        interval: Duration,
    ) -> Result<(), CacheError> {
        if interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be greater than zero".to_string(),
            ));
        }

        let mut slot = self.daemon.lock();
        // Dropping the previous daemon cancels and joins it.
        slot.take();

        let daemon = MaintenanceDaemon::start(Arc::clone(&self.inner), first_delay, interval)
            .map_err(CacheError::Maintenance)?;
        *slot = Some(daemon);
        Ok(())
    }

    /// Cancel background sweeps and wait for the thread to exit.
    ///
    /// A sweep in progress stops before its next deletion.
    pub fn stop_maintenance(&self) {
        let daemon = self.daemon.lock().take();
        if let Some(mut daemon) = daemon {
            daemon.shutdown();
            daemon.join();
        }
    }

    /// Whether background sweeps are scheduled.
    pub fn is_maintaining(&self) -> bool {
        self.daemon
            .lock()
            .as_ref()
            .map(MaintenanceDaemon::is_running)
            .unwrap_or(false)
    }

    /// Current file count and size of the tree.
    pub fn usage(&self) -> Result<CacheUsage, CacheError> {
        Ok(directory_usage(self.root())?)
    }

    /// Sweep statistics since construction.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Delete every cached file, keeping the root directory.
    pub fn clear(&self) -> ClearReport {
        let report = clear_directory(self.root());
        log_info!(
            self.inner.logger,
            LOG_CATEGORY,
            "Cleared {} files ({} bytes)",
            report.files_deleted,
            report.bytes_freed
        );
        report
    }
}

impl Drop for BoundedDiskCache {
    fn drop(&mut self) {
        self.stop_maintenance();
    }
}

fn probe_writable(dir: &Path) -> Result<(), CacheError> {
    let probe = dir.join(WRITE_PROBE_NAME);
    fs::write(&probe, b"").map_err(|source| CacheError::Unwritable {
        path: dir.to_path_buf(),
        source,
    })?;
    let _ = fs::remove_file(&probe);
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
