//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;
use std::time::Duration;

use crate::tile::ImageExtension;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// Disk cache location, bounds and sweep schedule
    pub cache: CacheSettings,
    /// Tile resolution settings shared by every tile set
    pub tiles: TilesSettings,
    /// Download worker settings
    pub download: DownloadSettings,
    /// Logging settings
    pub logging: LoggingSettings,
    /// One entry per `[tileset.<name>]` section, in file order
    pub tile_sets: Vec<TileSetSettings>,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Cache root directory
    pub directory: PathBuf,
    /// Eviction starts above this many bytes
    pub upper_limit: u64,
    /// Eviction stops at or below this many bytes
    pub lower_limit: u64,
    /// Time between background sweeps
    pub sweep_interval: Duration,
    /// Sweep phase reference, seconds since the Unix epoch
    pub sweep_reference: u64,
}

/// `[tiles]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesSettings {
    /// Read-only directory of shipped tiles
    pub authored_directory: Option<PathBuf>,
    /// Image served for tiles that cannot be downloaded
    pub placeholder: Option<PathBuf>,
    /// How long a failed tile is left alone
    pub retry_backoff: Duration,
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Concurrent fetches
    pub max_concurrent: usize,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

/// `[tileset.<name>]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSetSettings {
    pub name: String,
    pub extension: ImageExtension,
    /// Directory relative to the cache root; the name when unset
    pub directory: Option<PathBuf>,
    /// Age after which a cached tile is refreshed; never when unset
    pub expiration: Option<Duration>,
    pub downloadable: bool,
    /// Source URL template with `{level}`, `{row}`, `{col}`, `{ext}`
    pub url: Option<String>,
}

impl TileSetSettings {
    /// A downloadable set stored under its own name.
    pub fn new(name: impl Into<String>, extension: ImageExtension) -> Self {
        Self {
            name: name.into(),
            extension,
            directory: None,
            expiration: None,
            downloadable: true,
            url: None,
        }
    }
}
