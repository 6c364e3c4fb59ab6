//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::time::Duration;

use ini::{Ini, Properties};

use super::defaults::clamp_download_concurrent;
use super::duration::parse_duration;
use super::file::ConfigFileError;
use super::settings::{ConfigFile, TileSetSettings};
use super::size::parse_size;
use crate::tile::ImageExtension;

/// Section prefix for per-set settings, e.g. `[tileset.earth]`.
pub(super) const TILESET_SECTION_PREFIX: &str = "tileset.";

const SIZE_HINT: &str = "expected format like '2GB', '500MB', or '1024KB'";
const DURATION_HINT: &str = "expected format like '30s', '10m', '24h', or '7d'";

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = non_empty(section, "directory") {
            config.cache.directory = expand_tilde(v);
        }
        if let Some(v) = section.get("upper_limit") {
            config.cache.upper_limit = parse_size(v)
                .map_err(|_| invalid("cache", "upper_limit", v, SIZE_HINT))?;
        }
        if let Some(v) = section.get("lower_limit") {
            config.cache.lower_limit = parse_size(v)
                .map_err(|_| invalid("cache", "lower_limit", v, SIZE_HINT))?;
        }
        if let Some(v) = section.get("sweep_interval") {
            let interval = parse_duration(v)
                .map_err(|_| invalid("cache", "sweep_interval", v, DURATION_HINT))?;
            if interval.is_zero() {
                return Err(invalid("cache", "sweep_interval", v, "must be greater than zero"));
            }
            config.cache.sweep_interval = interval;
        }
        if let Some(v) = section.get("sweep_reference") {
            config.cache.sweep_reference = v.trim().parse().map_err(|_| {
                invalid("cache", "sweep_reference", v, "must be seconds since the Unix epoch")
            })?;
        }

        if config.cache.lower_limit > config.cache.upper_limit {
            let value = section.get("lower_limit").unwrap_or_default();
            return Err(invalid(
                "cache",
                "lower_limit",
                value,
                "must not exceed upper_limit",
            ));
        }
    }

    // [tiles] section
    if let Some(section) = ini.section(Some("tiles")) {
        if let Some(v) = non_empty(section, "authored_directory") {
            config.tiles.authored_directory = Some(expand_tilde(v));
        }
        if let Some(v) = non_empty(section, "placeholder") {
            config.tiles.placeholder = Some(expand_tilde(v));
        }
        if let Some(v) = section.get("retry_backoff") {
            config.tiles.retry_backoff = parse_duration(v)
                .map_err(|_| invalid("tiles", "retry_backoff", v, DURATION_HINT))?;
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("max_concurrent") {
            let value: usize = v
                .trim()
                .parse()
                .map_err(|_| invalid("download", "max_concurrent", v, "must be a positive integer"))?;
            config.download.max_concurrent = clamp_download_concurrent(value);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = expand_tilde(v);
        }
    }

    // [tileset.<name>] sections
    for (name, section) in ini.iter() {
        let Some(set_name) = name.and_then(|n| n.strip_prefix(TILESET_SECTION_PREFIX)) else {
            continue;
        };
        config.tile_sets.push(parse_tile_set(set_name, section)?);
    }

    Ok(config)
}

fn parse_tile_set(name: &str, section: &Properties) -> Result<TileSetSettings, ConfigFileError> {
    let section_name = format!("{}{}", TILESET_SECTION_PREFIX, name);
    if name.trim().is_empty() {
        return Err(invalid(&section_name, "name", name, "tile set name must not be empty"));
    }

    let extension = match section.get("extension") {
        Some(v) => ImageExtension::parse(v).ok_or_else(|| {
            invalid(
                &section_name,
                "extension",
                v,
                "must be one of: jpg, jpeg, png, dds, bmp, gif, tif, tiff, webp",
            )
        })?,
        None => {
            return Err(invalid(&section_name, "extension", "", "is required"));
        }
    };

    let mut settings = TileSetSettings::new(name.trim(), extension);

    if let Some(v) = non_empty(section, "directory") {
        settings.directory = Some(PathBuf::from(v));
    }
    if let Some(v) = non_empty(section, "expiration") {
        let expiration: Duration = parse_duration(v)
            .map_err(|_| invalid(&section_name, "expiration", v, DURATION_HINT))?;
        settings.expiration = (!expiration.is_zero()).then_some(expiration);
    }
    if let Some(v) = section.get("downloadable") {
        settings.downloadable = parse_bool(v);
    }
    if let Some(v) = non_empty(section, "url") {
        settings.url = Some(v.to_string());
    }

    Ok(settings)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a boolean value from INI config.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
