//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::fmt::Write;
use std::path::Path;

use super::duration::format_duration;
use super::parser::TILESET_SECTION_PREFIX;
use super::settings::{ConfigFile, TileSetSettings};
use super::size::format_size;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let authored_directory = optional_path(config.tiles.authored_directory.as_deref());
    let placeholder = optional_path(config.tiles.placeholder.as_deref());

    let mut out = format!(
        r#"[cache]
; Cache root directory. Tiles of each set live under <directory>/<set directory>/
directory = {}
; Eviction starts once the cache holds more than upper_limit bytes and
; stops at or below lower_limit. Supports KB, MB, GB suffixes.
upper_limit = {}
lower_limit = {}
; Time between background sweeps (s, m, h, d suffixes)
sweep_interval = {}
; Sweeps run on a fixed grid counted from this Unix timestamp, so timing
; survives restarts. 0 = Unix epoch
sweep_reference = {}

[tiles]
; Read-only directory of tiles shipped with the application (optional)
authored_directory = {}
; Image served when a tile cannot be downloaded (optional)
placeholder = {}
; How long a failed download blocks new attempts for the same tile
retry_backoff = {}

[download]
; Concurrent tile fetches (1-256)
max_concurrent = {}

[logging]
; Log file location
file = {}
"#,
        path_to_string(&config.cache.directory),
        format_size(config.cache.upper_limit),
        format_size(config.cache.lower_limit),
        format_duration(config.cache.sweep_interval),
        config.cache.sweep_reference,
        authored_directory,
        placeholder,
        format_duration(config.tiles.retry_backoff),
        config.download.max_concurrent,
        path_to_string(&config.logging.file),
    );

    if config.tile_sets.is_empty() {
        out.push_str(
            r#"
; Tile sets, one section each:
; [tileset.earth]
; extension = jpg
; url = https://tiles.example.com/{level}/{row}/{col}.{ext}
; expiration = 30d
; downloadable = true
"#,
        );
    }

    for set in &config.tile_sets {
        write_tile_set(&mut out, set);
    }

    out
}

fn write_tile_set(out: &mut String, set: &TileSetSettings) {
    let _ = writeln!(out);
    let _ = writeln!(out, "[{}{}]", TILESET_SECTION_PREFIX, set.name);
    let _ = writeln!(out, "extension = {}", set.extension);
    if let Some(dir) = &set.directory {
        let _ = writeln!(out, "directory = {}", path_to_string(dir));
    }
    if let Some(expiration) = set.expiration {
        let _ = writeln!(out, "expiration = {}", format_duration(expiration));
    }
    let _ = writeln!(out, "downloadable = {}", set.downloadable);
    if let Some(url) = &set.url {
        let _ = writeln!(out, "url = {}", url);
    }
}

fn optional_path(path: Option<&Path>) -> String {
    path.map(path_to_string).unwrap_or_default()
}

/// Convert a path to a string for INI output.
fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
