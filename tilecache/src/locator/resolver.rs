//! Tile locator.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::trace;

use super::sentinel::BadTileSentinel;
use super::types::{LocatorSettings, ResolvedTile, TileOrigin};
use crate::cache::BoundedDiskCache;
use crate::download::{DownloadKind, DownloadQueue, DownloadRequest};
use crate::log::Logger;
use crate::tile::{
    row_directory, tile_file_name, tile_path, tile_stem, ImageExtension, TileAddress, TileSet,
    RECOGNIZED_EXTENSIONS,
};
use crate::{log_debug, log_warn};

const LOG_CATEGORY: &str = "locator";

/// A cache file found for a tile.
struct CacheHit {
    path: PathBuf,
    modified: Option<SystemTime>,
}

/// Resolves tile addresses of one tile set to files on disk.
///
/// Resolution only stats local files and, on a miss or an expired hit, makes
/// a non-blocking call to the download queue. It is safe to call from many
/// threads at once; concurrent misses for the same tile may each enqueue a
/// request.
pub struct TileLocator {
    tile_set: TileSet,
    cache_base: PathBuf,
    authored_base: Option<PathBuf>,
    settings: LocatorSettings,
    queue: Arc<dyn DownloadQueue>,
    logger: Arc<dyn Logger>,
}

impl TileLocator {
    /// Create a locator whose cache tier is `cache_root`.
    pub fn new(
        tile_set: TileSet,
        cache_root: &Path,
        settings: LocatorSettings,
        queue: Arc<dyn DownloadQueue>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let cache_base = tile_set.base_in(cache_root);
        let authored_base = settings
            .authored_dir
            .as_deref()
            .map(|dir| tile_set.base_in(dir));

        Self {
            tile_set,
            cache_base,
            authored_base,
            settings,
            queue,
            logger,
        }
    }

    /// Create a locator over the directory managed by `cache`.
    pub fn for_cache(
        tile_set: TileSet,
        cache: &BoundedDiskCache,
        settings: LocatorSettings,
        queue: Arc<dyn DownloadQueue>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self::new(tile_set, cache.root(), settings, queue, logger)
    }

    /// Tile set this locator serves.
    pub fn tile_set(&self) -> &TileSet {
        &self.tile_set
    }

    /// Where a downloaded copy of `address` is stored.
    pub fn cache_path(&self, address: &TileAddress) -> PathBuf {
        tile_path(&self.cache_base, address, self.tile_set.extension)
    }

    /// Sentinel that would record a failed download of `address`.
    pub fn sentinel(&self, address: &TileAddress) -> BadTileSentinel {
        BadTileSentinel::for_target(&self.cache_path(address))
    }

    /// Resolve a tile.
    ///
    /// Search order, first match wins:
    /// 1. authored-data directory, exact path
    /// 2. cache, exact path with the set's extension
    /// 3. cache, same name with another recognized extension, in allow-list
    ///    order
    /// 4. on a miss: suppressed by a recent sentinel, else download,
    ///    placeholder, or unavailable
    ///
    /// A cache hit older than the set's expiration is still returned, and a
    /// refresh is queued alongside it.
    pub fn resolve(&self, address: &TileAddress) -> ResolvedTile {
        let now = SystemTime::now();

        if let Some(authored) = &self.authored_base {
            let path = tile_path(authored, address, self.tile_set.extension);
            if path.is_file() {
                return ResolvedTile::Ready {
                    path,
                    origin: TileOrigin::Authored,
                };
            }
        }

        let target = self.cache_path(address);
        match self.find_cached(address, &target) {
            Some(hit) => self.serve_cached(address, hit, target, now),
            None => self.resolve_miss(address, target, now),
        }
    }

    fn find_cached(&self, address: &TileAddress, target: &Path) -> Option<CacheHit> {
        if let Some(hit) = cache_hit(target) {
            return Some(hit);
        }

        let row_dir = row_directory(&self.cache_base, address);
        RECOGNIZED_EXTENSIONS
            .iter()
            .filter(|ext| **ext != self.tile_set.extension)
            .find_map(|ext| cache_hit(&row_dir.join(tile_file_name(address, *ext))))
            .or_else(|| self.scan_row_directory(address, &row_dir))
    }

    /// Finds tile files whose extension differs only in case, e.g. `.PNG`.
    ///
    /// The configured extension wins, then allow-list order.
    fn scan_row_directory(&self, address: &TileAddress, row_dir: &Path) -> Option<CacheHit> {
        let stem = tile_stem(address);
        let priority = |ext: ImageExtension| {
            if ext == self.tile_set.extension {
                0
            } else {
                1 + RECOGNIZED_EXTENSIONS
                    .iter()
                    .position(|known| *known == ext)
                    .unwrap_or(RECOGNIZED_EXTENSIONS.len())
            }
        };

        fs::read_dir(row_dir)
            .ok()?
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.file_stem()?.to_str()? != stem {
                    return None;
                }
                let ext = ImageExtension::parse(path.extension()?.to_str()?)?;
                Some((priority(ext), path))
            })
            .min_by_key(|(rank, _)| *rank)
            .and_then(|(_, path)| cache_hit(&path))
    }

    fn serve_cached(
        &self,
        address: &TileAddress,
        hit: CacheHit,
        target: PathBuf,
        now: SystemTime,
    ) -> ResolvedTile {
        let expired = match (self.tile_set.expiration, hit.modified) {
            (Some(expiration), Some(modified)) => crate::time::age(now, modified) >= expiration,
            _ => false,
        };

        if !expired {
            return ResolvedTile::Ready {
                path: hit.path,
                origin: TileOrigin::Cached,
            };
        }

        let sentinel = BadTileSentinel::for_target(&target);
        if self.tile_set.downloadable && !sentinel.is_active(now, self.settings.retry_backoff) {
            trace!(tile = %address, "Cached tile expired, queueing refresh");
            self.enqueue(address, target, DownloadKind::Refresh);
        }

        ResolvedTile::Ready {
            path: hit.path,
            origin: TileOrigin::CachedStale,
        }
    }

    fn resolve_miss(&self, address: &TileAddress, target: PathBuf, now: SystemTime) -> ResolvedTile {
        let sentinel = BadTileSentinel::for_target(&target);
        if let Some(age) = sentinel.age(now) {
            if age < self.settings.retry_backoff {
                trace!(tile = %address, "Tile marked bad, skipping download");
                return ResolvedTile::Unavailable;
            }
            log_debug!(
                self.logger,
                LOG_CATEGORY,
                "Retrying {} tile {} after {}s backoff",
                self.tile_set.name,
                address,
                age.as_secs()
            );
            if let Err(e) = sentinel.remove() {
                log_debug!(
                    self.logger,
                    LOG_CATEGORY,
                    "Could not remove sentinel {}: {}",
                    sentinel.path().display(),
                    e
                );
            }
        }

        if self.tile_set.downloadable {
            self.enqueue(address, target.clone(), DownloadKind::Missing);
            return ResolvedTile::Pending { target };
        }

        if let Some(placeholder) = &self.settings.placeholder {
            if placeholder.is_file() {
                return ResolvedTile::Ready {
                    path: placeholder.clone(),
                    origin: TileOrigin::Placeholder,
                };
            }
        }

        ResolvedTile::Unavailable
    }

    fn enqueue(&self, address: &TileAddress, target: PathBuf, kind: DownloadKind) {
        let request = DownloadRequest {
            target,
            tile_set: self.tile_set.name.clone(),
            address: *address,
            source_url: self.tile_set.source_url(address),
            kind,
        };

        if !self.queue.enqueue(request) {
            log_warn!(
                self.logger,
                LOG_CATEGORY,
                "Download queue closed, dropped request for {} tile {}",
                self.tile_set.name,
                address
            );
        }
    }
}

fn cache_hit(path: &Path) -> Option<CacheHit> {
    // A file removed by a sweep between this stat and the caller's read
    // shows up as a load failure on their side, not here.
    let metadata = fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }
    Some(CacheHit {
        path: path.to_path_buf(),
        modified: metadata.modified().ok(),
    })
}
