//! Resolution results and locator settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default time a failed tile is left alone before another download attempt.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Where a ready tile was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOrigin {
    /// Read-only authored-data directory
    Authored,
    /// Cache, within its expiration
    Cached,
    /// Cache, past its expiration; a refresh has been requested
    CachedStale,
    /// Shared placeholder image standing in for a tile that cannot be fetched
    Placeholder,
}

/// Outcome of resolving one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTile {
    /// A file is ready to load
    Ready { path: PathBuf, origin: TileOrigin },
    /// Not on disk; a download to `target` has been queued
    Pending { target: PathBuf },
    /// No source can provide the tile right now
    Unavailable,
}

impl ResolvedTile {
    /// Path to load, if the tile is ready.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ResolvedTile::Ready { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Origin of a ready tile.
    pub fn origin(&self) -> Option<TileOrigin> {
        match self {
            ResolvedTile::Ready { origin, .. } => Some(*origin),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ResolvedTile::Ready { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ResolvedTile::Pending { .. })
    }
}

/// Locator settings shared by every tile set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorSettings {
    /// Read-only directory of tiles shipped with the application
    pub authored_dir: Option<PathBuf>,
    /// Image served when a tile cannot be downloaded
    pub placeholder: Option<PathBuf>,
    /// How long a bad-tile sentinel suppresses new download attempts
    pub retry_backoff: Duration,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            authored_dir: None,
            placeholder: None,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl LocatorSettings {
    pub fn with_authored_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.authored_dir = Some(dir.into());
        self
    }

    pub fn with_placeholder(mut self, path: impl Into<PathBuf>) -> Self {
        self.placeholder = Some(path.into());
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}
