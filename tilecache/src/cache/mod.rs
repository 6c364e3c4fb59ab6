//! Size-bounded disk cache.
//!
//! A [`BoundedDiskCache`] owns one directory tree and keeps it within a byte
//! budget by evicting least-recently-accessed files on a background schedule.
//! It has no notion of tiles; the [`crate::locator`] module layers tile
//! semantics on top of the directory it manages.

mod daemon;
mod disk;
mod eviction;
mod stats;
mod types;
mod walk;

pub use disk::BoundedDiskCache;
pub use eviction::{ClearReport, SweepReport, MIN_RETAINED_FILES};
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use types::{
    CacheError, DiskCacheConfig, DEFAULT_LOWER_LIMIT_BYTES, DEFAULT_SWEEP_INTERVAL,
    DEFAULT_UPPER_LIMIT_BYTES,
};
pub use walk::{directory_usage, walk_cache_files, CacheFile, CacheUsage};
