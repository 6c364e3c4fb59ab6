//! Tile path construction.

use std::path::{Path, PathBuf};

use super::address::TileAddress;
use super::extension::ImageExtension;

/// File name without extension: `<row:04>_<col:04>`.
///
/// Values wider than four digits are written in full.
pub fn tile_stem(address: &TileAddress) -> String {
    format!("{:04}_{:04}", address.row, address.col)
}

/// File name with extension: `<row:04>_<col:04>.<ext>`.
pub fn tile_file_name(address: &TileAddress, extension: ImageExtension) -> String {
    format!("{}.{}", tile_stem(address), extension)
}

/// Directory holding every tile of one row: `<base>/<level>/<row:04>`.
///
/// The level is not padded.
///
/// ```
/// use std::path::PathBuf;
/// use tilecache::tile::{row_directory, TileAddress};
///
/// let dir = row_directory(&PathBuf::from("/cache/earth"), &TileAddress::new(3, 5, 7));
/// assert_eq!(dir, PathBuf::from("/cache/earth/3/0005"));
/// ```
pub fn row_directory(base: &Path, address: &TileAddress) -> PathBuf {
    base.join(address.level.to_string())
        .join(format!("{:04}", address.row))
}

/// Full tile path under `base`.
///
/// ```
/// use std::path::PathBuf;
/// use tilecache::tile::{tile_path, ImageExtension, TileAddress};
///
/// let path = tile_path(
///     &PathBuf::from("/cache/earth"),
///     &TileAddress::new(3, 5, 7),
///     ImageExtension::Jpg,
/// );
/// assert_eq!(path, PathBuf::from("/cache/earth/3/0005/0005_0007.jpg"));
/// ```
pub fn tile_path(base: &Path, address: &TileAddress, extension: ImageExtension) -> PathBuf {
    row_directory(base, address).join(tile_file_name(address, extension))
}
