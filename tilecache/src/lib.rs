//! tilecache - size-bounded disk cache and tile resolution for streamed
//! imagery.
//!
//! The crate has two layers:
//!
//! - [`cache`]: a [`BoundedDiskCache`](cache::BoundedDiskCache) that owns one
//!   directory tree and keeps it under a byte budget by evicting
//!   least-recently-accessed files from a low-priority background thread.
//! - [`locator`]: a [`TileLocator`](locator::TileLocator) that maps a tile
//!   address to a file on disk, searching an authored-data directory, the
//!   cache and alternate image extensions, and queueing downloads for misses
//!   and expired tiles.
//!
//! Downloads themselves are the host's business: the locator only enqueues
//! [`DownloadRequest`](download::DownloadRequest)s, and
//! [`DownloadWorker`](download::DownloadWorker) drives a host-supplied
//! [`TileFetcher`](download::TileFetcher).
//!
//! ```no_run
//! use std::sync::Arc;
//! use tilecache::cache::{BoundedDiskCache, DiskCacheConfig};
//! use tilecache::download::download_channel;
//! use tilecache::locator::{LocatorSettings, TileLocator};
//! use tilecache::log::TracingLogger;
//! use tilecache::tile::{ImageExtension, TileAddress, TileSet};
//!
//! # fn main() -> Result<(), tilecache::cache::CacheError> {
//! let logger = Arc::new(TracingLogger);
//! let cache = BoundedDiskCache::new(DiskCacheConfig::new("/var/cache/tiles"), logger.clone())?;
//! cache.start_maintenance()?;
//!
//! let (queue, _requests) = download_channel();
//! let locator = TileLocator::for_cache(
//!     TileSet::new("earth", ImageExtension::Jpg),
//!     &cache,
//!     LocatorSettings::default(),
//!     Arc::new(queue),
//!     logger,
//! );
//! let tile = locator.resolve(&TileAddress::new(5, 10, 20));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod download;
pub mod locator;
pub mod log;
pub mod logging;
pub mod tile;
pub mod time;

/// Version of the tilecache library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
