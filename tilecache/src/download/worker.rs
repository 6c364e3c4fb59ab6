//! Download worker.
//!
//! Drains a request channel, fetches tiles through a host-supplied
//! [`TileFetcher`] and writes the results into the cache. Requests for a
//! target that is already being fetched are dropped rather than fetched twice.

use std::collections::HashSet;
use std::fs;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::queue::{DownloadKind, DownloadRequest};
use crate::locator::BadTileSentinel;
use crate::log::Logger;
use crate::{log_info, log_warn};

/// Default number of fetches allowed to run at once.
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 8;

const LOG_CATEGORY: &str = "download";

/// Why a fetch produced no tile.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("tile set has no source for this tile")]
    NoSource,

    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("empty response")]
    Empty,
}

/// Transport that turns a request into image bytes.
///
/// Implemented by the host; this crate has no HTTP client of its own.
pub trait TileFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        request: &DownloadRequest,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Download counters.
#[derive(Debug, Default)]
pub struct DownloadStats {
    requested: AtomicU64,
    coalesced: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`DownloadStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStatsSnapshot {
    /// Requests received from the queue
    pub requested: u64,
    /// Requests dropped because the same target was already in flight
    pub coalesced: u64,
    /// Tiles written to the cache
    pub succeeded: u64,
    /// Fetches or writes that failed
    pub failed: u64,
}

impl DownloadStats {
    pub fn snapshot(&self) -> DownloadStatsSnapshot {
        DownloadStatsSnapshot {
            requested: self.requested.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Targets currently being fetched.
#[derive(Debug, Default)]
struct InFlight {
    targets: Mutex<HashSet<PathBuf>>,
}

impl InFlight {
    /// Claim `target`, or `None` if another task already holds it.
    fn claim(self: &Arc<Self>, target: &Path) -> Option<InFlightGuard> {
        if !self.targets.lock().insert(target.to_path_buf()) {
            return None;
        }
        Some(InFlightGuard {
            in_flight: Arc::clone(self),
            target: target.to_path_buf(),
        })
    }

    fn len(&self) -> usize {
        self.targets.lock().len()
    }
}

/// Releases a claimed target when the fetch task ends, however it ends.
struct InFlightGuard {
    in_flight: Arc<InFlight>,
    target: PathBuf,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.targets.lock().remove(&self.target);
    }
}

/// Consumes download requests with bounded concurrency.
pub struct DownloadWorker<F> {
    fetcher: Arc<F>,
    max_concurrent: usize,
    logger: Arc<dyn Logger>,
    stats: Arc<DownloadStats>,
}

impl<F: TileFetcher> DownloadWorker<F> {
    pub fn new(fetcher: F, logger: Arc<dyn Logger>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            max_concurrent: DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            logger,
            stats: Arc::new(DownloadStats::default()),
        }
    }

    /// Limit concurrent fetches. Zero is treated as one.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Upper bound on fetches running at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Shared counters, readable while the worker runs.
    pub fn stats(&self) -> Arc<DownloadStats> {
        Arc::clone(&self.stats)
    }

    /// Process requests until the channel closes or `cancellation` fires.
    ///
    /// When the channel closes, fetches already started are allowed to
    /// finish. On cancellation they are aborted; a target whose write was
    /// interrupted never appears, since tiles are written via rename.
    pub async fn run(
        self,
        mut receiver: mpsc::UnboundedReceiver<DownloadRequest>,
        cancellation: CancellationToken,
    ) -> DownloadStatsSnapshot {
        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let in_flight = Arc::new(InFlight::default());
        let mut tasks: JoinSet<()> = JoinSet::new();

        log_info!(
            self.logger,
            LOG_CATEGORY,
            "Download worker started ({} concurrent)",
            self.max_concurrent
        );

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    debug!(pending = tasks.len(), "Download worker cancelled");
                    tasks.abort_all();
                    break;
                }
                request = receiver.recv() => match request {
                    Some(request) => self.dispatch(request, &permits, &in_flight, &mut tasks),
                    None => {
                        debug!(pending = tasks.len(), "Download queue closed, draining");
                        break;
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_join_error(joined);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            log_join_error(joined);
        }

        let snapshot = self.stats.snapshot();
        log_info!(
            self.logger,
            LOG_CATEGORY,
            "Download worker stopped: {} requested, {} succeeded, {} failed, {} coalesced",
            snapshot.requested,
            snapshot.succeeded,
            snapshot.failed,
            snapshot.coalesced
        );
        snapshot
    }

    fn dispatch(
        &self,
        request: DownloadRequest,
        permits: &Arc<Semaphore>,
        in_flight: &Arc<InFlight>,
        tasks: &mut JoinSet<()>,
    ) {
        self.stats.requested.fetch_add(1, Ordering::Relaxed);

        let Some(guard) = in_flight.claim(&request.target) else {
            self.stats.coalesced.fetch_add(1, Ordering::Relaxed);
            trace!(path = %request.target.display(), "Download already in flight");
            return;
        };

        trace!(
            tile = %request.address,
            tile_set = %request.tile_set,
            in_flight = in_flight.len(),
            "Download queued"
        );

        let fetcher = Arc::clone(&self.fetcher);
        let permits = Arc::clone(permits);
        let logger = Arc::clone(&self.logger);
        let stats = Arc::clone(&self.stats);

        tasks.spawn(async move {
            let _guard = guard;
            // A closed semaphore only happens if the worker is gone.
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            process(fetcher.as_ref(), request, logger.as_ref(), &stats).await;
        });
    }
}

async fn process<F: TileFetcher>(
    fetcher: &F,
    request: DownloadRequest,
    logger: &dyn Logger,
    stats: &DownloadStats,
) {
    let sentinel = BadTileSentinel::for_target(&request.target);

    let bytes = match fetcher.fetch(&request).await {
        Ok(bytes) if bytes.is_empty() => Err(FetchError::Empty),
        other => other,
    };

    let bytes = match bytes {
        Ok(bytes) => bytes,
        Err(e) => {
            stats.failed.fetch_add(1, Ordering::Relaxed);
            if request.kind == DownloadKind::Refresh {
                debug!(tile = %request.address, error = %e, "Refresh failed, keeping stale copy");
            }
            log_warn!(
                logger,
                LOG_CATEGORY,
                "Download of {} tile {} failed: {}",
                request.tile_set,
                request.address,
                e
            );
            let reason = e.to_string();
            let written =
                tokio::task::spawn_blocking(move || sentinel.write(&reason)).await;
            if let Ok(Err(e)) = written {
                debug!(path = %request.target.display(), error = %e, "Failed to write sentinel");
            }
            return;
        }
    };

    let size = bytes.len();
    let target = request.target.clone();
    let written = tokio::task::spawn_blocking(move || {
        write_tile_file(&target, &bytes)?;
        sentinel.remove()
    })
    .await
    .unwrap_or_else(|e| Err(io::Error::other(e)));

    match written {
        Ok(()) => {
            stats.succeeded.fetch_add(1, Ordering::Relaxed);
            debug!(
                tile = %request.address,
                tile_set = %request.tile_set,
                bytes = size,
                "Tile downloaded"
            );
        }
        Err(e) => {
            // Local write trouble is not the tile's fault; no sentinel.
            stats.failed.fetch_add(1, Ordering::Relaxed);
            log_warn!(
                logger,
                LOG_CATEGORY,
                "Could not store tile {}: {}",
                request.target.display(),
                e
            );
        }
    }
}

fn log_join_error(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            warn!(error = %e, "Download task panicked");
        }
    }
}

/// Write `bytes` to `target` atomically.
///
/// Data goes to a temporary sibling first and is renamed into place, so
/// readers never see a partial tile. Parent directories are created.
pub fn write_tile_file(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = target
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "target has no parent"))?;
    fs::create_dir_all(parent)?;

    let file_name = target
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "target has no file name"))?;
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(format!(".{}.part", std::process::id()));
    let temp_path = parent.join(temp_name);

    let result = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, target)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
