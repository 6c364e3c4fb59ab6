//! Sweep statistics for monitoring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use super::eviction::SweepReport;

/// Counters updated by every sweep, safe to read from any thread.
#[derive(Debug)]
pub struct CacheStats {
    sweeps: AtomicU64,
    evicting_sweeps: AtomicU64,
    files_evicted: AtomicU64,
    bytes_freed: AtomicU64,
    sweep_failures: AtomicU64,
    last_report: Mutex<Option<SweepReport>>,
    created_at: Instant,
}

/// Point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone)]
pub struct CacheStatsSnapshot {
    /// Completed sweeps, including no-op ones
    pub sweeps: u64,
    /// Sweeps that found the cache over its upper bound
    pub evicting_sweeps: u64,
    /// Files deleted across all sweeps
    pub files_evicted: u64,
    /// Bytes freed across all sweeps
    pub bytes_freed: u64,
    /// Sweeps that ended with an error or panic
    pub sweep_failures: u64,
    /// Report of the most recent successful sweep
    pub last_report: Option<SweepReport>,
    /// Time since the cache was constructed
    pub uptime: std::time::Duration,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStats {
    /// Create zeroed statistics.
    pub fn new() -> Self {
        Self {
            sweeps: AtomicU64::new(0),
            evicting_sweeps: AtomicU64::new(0),
            files_evicted: AtomicU64::new(0),
            bytes_freed: AtomicU64::new(0),
            sweep_failures: AtomicU64::new(0),
            last_report: Mutex::new(None),
            created_at: Instant::now(),
        }
    }

    /// Record a completed sweep.
    pub fn record_sweep(&self, report: &SweepReport) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        if report.evicted {
            self.evicting_sweeps.fetch_add(1, Ordering::Relaxed);
        }
        self.files_evicted
            .fetch_add(report.files_deleted as u64, Ordering::Relaxed);
        self.bytes_freed
            .fetch_add(report.bytes_freed, Ordering::Relaxed);
        *self.last_report.lock() = Some(report.clone());
    }

    /// Record a sweep that failed before completing.
    pub fn record_failure(&self) {
        self.sweep_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot of the counters.
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            sweeps: self.sweeps.load(Ordering::Relaxed),
            evicting_sweeps: self.evicting_sweeps.load(Ordering::Relaxed),
            files_evicted: self.files_evicted.load(Ordering::Relaxed),
            bytes_freed: self.bytes_freed.load(Ordering::Relaxed),
            sweep_failures: self.sweep_failures.load(Ordering::Relaxed),
            last_report: self.last_report.lock().clone(),
            uptime: self.created_at.elapsed(),
        }
    }
}
