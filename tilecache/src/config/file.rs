//! Configuration file handling for ~/.tilecache/config.ini.
//!
//! Loads and saves user configuration with sensible defaults, and builds the
//! runtime configuration types from it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use ini::Ini;
use thiserror::Error;

use super::settings::{ConfigFile, TileSetSettings};
use crate::cache::DiskCacheConfig;
use crate::download::{DownloadWorker, TileFetcher};
use crate::locator::LocatorSettings;
use crate::log::Logger;
use crate::tile::TileSet;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.tilecache/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.tilecache/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Write a default config file at `path` unless one exists.
    ///
    /// Returns `true` when a file was written.
    pub fn ensure_exists_at(path: &Path) -> Result<bool, ConfigFileError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    /// Disk cache configuration from the `[cache]` section.
    pub fn disk_cache_config(&self) -> DiskCacheConfig {
        let reference = SystemTime::UNIX_EPOCH + Duration::from_secs(self.cache.sweep_reference);
        DiskCacheConfig::new(&self.cache.directory)
            .with_limits(self.cache.upper_limit, self.cache.lower_limit)
            .with_sweep_interval(self.cache.sweep_interval)
            .with_sweep_reference(reference)
    }

    /// Locator settings from the `[tiles]` section.
    pub fn locator_settings(&self) -> LocatorSettings {
        let mut settings =
            LocatorSettings::default().with_retry_backoff(self.tiles.retry_backoff);
        if let Some(dir) = &self.tiles.authored_directory {
            settings = settings.with_authored_dir(dir);
        }
        if let Some(placeholder) = &self.tiles.placeholder {
            settings = settings.with_placeholder(placeholder);
        }
        settings
    }

    /// Download worker over `fetcher`, limited by `[download] max_concurrent`.
    pub fn download_worker<F: TileFetcher>(
        &self,
        fetcher: F,
        logger: Arc<dyn Logger>,
    ) -> DownloadWorker<F> {
        DownloadWorker::new(fetcher, logger).with_max_concurrent(self.download.max_concurrent)
    }

    /// All configured tile sets, in file order.
    pub fn tile_sets(&self) -> Vec<TileSet> {
        self.tile_sets.iter().map(TileSetSettings::to_tile_set).collect()
    }

    /// The tile set called `name`, if configured.
    pub fn tile_set(&self, name: &str) -> Option<TileSet> {
        self.tile_sets
            .iter()
            .find(|s| s.name == name)
            .map(TileSetSettings::to_tile_set)
    }
}

impl TileSetSettings {
    /// Build the runtime tile set.
    pub fn to_tile_set(&self) -> TileSet {
        let mut set =
            TileSet::new(&self.name, self.extension).with_downloadable(self.downloadable);
        if let Some(dir) = &self.directory {
            set = set.with_directory(dir);
        }
        if let Some(expiration) = self.expiration {
            set = set.with_expiration(expiration);
        }
        if let Some(url) = &self.url {
            set = set.with_url_template(url);
        }
        set
    }
}

/// Get the path to the config directory (~/.tilecache).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tilecache")
}

/// Get the path to the config file (~/.tilecache/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
