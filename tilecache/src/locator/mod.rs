//! Tile path resolution.
//!
//! [`TileLocator`] answers "where is this tile on disk right now?" for one
//! tile set. It searches the read-only authored-data directory, then the
//! cache (exact extension first, then other recognized image extensions),
//! and on a miss either asks for a download, substitutes a placeholder, or
//! reports the tile unavailable. Expired cache hits are served immediately
//! while a refresh is queued.

mod resolver;
mod sentinel;
mod types;

pub use resolver::TileLocator;
pub use sentinel::{BadTileSentinel, SENTINEL_SUFFIX};
pub use types::{LocatorSettings, ResolvedTile, TileOrigin, DEFAULT_RETRY_BACKOFF};
