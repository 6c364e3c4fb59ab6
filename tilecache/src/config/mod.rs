//! Configuration file support.
//!
//! Settings live in `~/.tilecache/config.ini`. A missing file means defaults.
//! [`ConfigFile`] is the parsed form; it converts into the runtime types the
//! cache and locator take ([`DiskCacheConfig`](crate::cache::DiskCacheConfig),
//! [`TileSet`](crate::tile::TileSet),
//! [`LocatorSettings`](crate::locator::LocatorSettings)).
//!
//! ```
//! use tilecache::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! let cache_config = config.disk_cache_config();
//! assert!(cache_config.upper_limit_bytes >= cache_config.lower_limit_bytes);
//! ```

mod defaults;
mod duration;
mod file;
mod parser;
mod settings;
mod size;
mod writer;

pub use defaults::*;
pub use duration::{format_duration, parse_duration, DurationParseError};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CacheSettings, ConfigFile, DownloadSettings, LoggingSettings, TileSetSettings, TilesSettings,
};
pub use size::{format_size, parse_size, Size, SizeParseError};
