//! Download requests and the queue the locator hands them to.
//!
//! The locator only ever enqueues; it never waits for a download. Anything
//! implementing [`DownloadQueue`] can sit behind it. The crate ships an
//! unbounded tokio channel ([`download_channel`]) and a [`DownloadWorker`]
//! that drains it through a host-supplied [`TileFetcher`], writes finished
//! tiles into the cache, and records failures as bad-tile sentinels.

mod queue;
mod worker;

pub use queue::{download_channel, ChannelDownloadQueue, DownloadKind, DownloadQueue, DownloadRequest};
pub use worker::{
    write_tile_file, DownloadStats, DownloadStatsSnapshot, DownloadWorker, FetchError,
    TileFetcher, DEFAULT_MAX_CONCURRENT_DOWNLOADS,
};
