//! Background maintenance thread for the bounded disk cache.
//!
//! The daemon runs sweeps on a dedicated OS thread so blocking filesystem
//! work never lands on a caller's thread or an async runtime worker. The
//! thread lowers its own scheduling priority and yields between deletions,
//! leaving foreground tile resolution ahead of it.
//!
//! Sweeps are scheduled on a fixed grid: the first fires after the supplied
//! delay and each later one exactly one interval after the previous deadline,
//! independent of how long the sweeps themselves take.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use super::disk::CacheInner;

/// Niceness applied to the maintenance thread on Linux.
#[cfg(target_os = "linux")]
const SWEEP_NICENESS: libc::c_int = 10;

/// Cancellation flag the maintenance thread can sleep on.
#[derive(Debug, Default)]
pub(crate) struct ShutdownSignal {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl ShutdownSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Request shutdown and wake the sleeping thread.
    pub(crate) fn cancel(&self) {
        *self.cancelled.lock() = true;
        self.condvar.notify_all();
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        *self.cancelled.lock()
    }

    /// Sleep until `deadline`. Returns `true` if cancelled meanwhile.
    pub(crate) fn wait_until(&self, deadline: Instant) -> bool {
        let mut cancelled = self.cancelled.lock();
        while !*cancelled {
            if self.condvar.wait_until(&mut cancelled, deadline).timed_out() {
                return *cancelled;
            }
        }
        true
    }
}

/// Handle to a running maintenance thread.
///
/// Dropping the handle cancels the schedule and joins the thread.
pub(crate) struct MaintenanceDaemon {
    thread_handle: Option<JoinHandle<()>>,
    shutdown: Arc<ShutdownSignal>,
}

impl MaintenanceDaemon {
    /// Spawn the maintenance thread.
    pub(crate) fn start(
        cache: Arc<CacheInner>,
        first_delay: Duration,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let shutdown = Arc::new(ShutdownSignal::new());
        let thread_shutdown = Arc::clone(&shutdown);

        let thread_handle = thread::Builder::new()
            .name("tile-cache-sweep".to_string())
            .spawn(move || {
                Self::run_loop(cache, first_delay, interval, thread_shutdown);
            })?;

        info!(
            first_delay_secs = first_delay.as_secs(),
            interval_secs = interval.as_secs(),
            "Disk cache maintenance started"
        );

        Ok(Self {
            thread_handle: Some(thread_handle),
            shutdown,
        })
    }

    fn run_loop(
        cache: Arc<CacheInner>,
        first_delay: Duration,
        interval: Duration,
        shutdown: Arc<ShutdownSignal>,
    ) {
        lower_thread_priority();

        let mut deadline = Instant::now() + first_delay;
        loop {
            if shutdown.wait_until(deadline) {
                debug!("Disk cache maintenance received shutdown signal");
                break;
            }

            cache.run_scheduled_sweep(&shutdown);

            deadline += interval;
            // A sweep that overran one or more slots skips them instead of
            // running back-to-back.
            let now = Instant::now();
            while deadline <= now {
                deadline += interval;
            }
        }

        debug!("Disk cache maintenance stopped");
    }

    /// Signal the thread to stop without waiting for it.
    pub(crate) fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Wait for the thread to finish.
    pub(crate) fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                warn!("Disk cache maintenance thread panicked: {:?}", e);
            }
        }
    }

    /// Check whether the thread is still running.
    pub(crate) fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for MaintenanceDaemon {
    fn drop(&mut self) {
        self.shutdown();
        self.join();
    }
}

#[cfg(target_os = "linux")]
fn lower_thread_priority() {
    // SAFETY: nice() has no memory-safety preconditions. On Linux it only
    // affects the calling thread.
    let result = unsafe { libc::nice(SWEEP_NICENESS) };
    if result == -1 {
        debug!(
            error = %std::io::Error::last_os_error(),
            "Could not lower maintenance thread priority"
        );
    }
}

#[cfg(not(target_os = "linux"))]
fn lower_thread_priority() {}
