//! Tile identity and on-disk layout.
//!
//! A tile is addressed by level, row and column. Each tile set decides the
//! file extension and the directory its tiles live under; every base
//! directory (authored data or cache) uses the same layout:
//!
//! ```text
//! <base>/<tileset dir>/<level>/<row:04>/<row:04>_<col:04>.<ext>
//! ```

mod address;
mod extension;
mod path;
mod set;

pub use address::TileAddress;
pub use extension::{ImageExtension, RECOGNIZED_EXTENSIONS};
pub use path::{row_directory, tile_file_name, tile_path, tile_stem};
pub use set::TileSet;
