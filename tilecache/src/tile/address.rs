//! Logical tile address.

use std::fmt;

/// Level, row and column of a tile within a tile set.
///
/// Owned by the caller and never modified during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileAddress {
    /// Zoom level
    pub level: u8,
    /// Row within the level
    pub row: u32,
    /// Column within the level
    pub col: u32,
}

impl TileAddress {
    /// Create a tile address.
    pub fn new(level: u8, row: u32, col: u32) -> Self {
        Self { level, row, col }
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{} R{} C{}", self.level, self.row, self.col)
    }
}
