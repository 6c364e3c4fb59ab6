//! Human-readable size parsing (e.g., "2GB", "500MB").

use std::fmt;
use thiserror::Error;

/// Error parsing a size string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid size '{input}' - expected format like '2GB', '500MB', or '1024KB'")]
pub struct SizeParseError {
    input: String,
}

impl SizeParseError {
    fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// Parse a human-readable size string into bytes.
///
/// Bare numbers are bytes. `K`/`KB`, `M`/`MB` and `G`/`GB` suffixes are
/// binary multiples, case-insensitive, with optional whitespace before the
/// suffix.
///
/// ```
/// use tilecache::config::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1 KB").unwrap(), 1024);
/// assert_eq!(parse_size("1536MB").unwrap(), 1536 * 1024 * 1024);
/// assert_eq!(parse_size("2gb").unwrap(), 2 * 1024 * 1024 * 1024);
/// ```
pub fn parse_size(s: &str) -> Result<u64, SizeParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(SizeParseError::new(s));
    }

    let upper = s.to_ascii_uppercase();
    let (num_str, multiplier) = [("GB", GB), ("G", GB), ("MB", MB), ("M", MB), ("KB", KB), ("K", KB)]
        .iter()
        .find(|(suffix, _)| upper.ends_with(suffix))
        .map(|(suffix, multiplier)| (s[..s.len() - suffix.len()].trim(), *multiplier))
        .unwrap_or((s, 1));

    let num: u64 = num_str.parse().map_err(|_| SizeParseError::new(s))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| SizeParseError::new(s))
}

/// Format a byte count with the largest exact unit.
///
/// ```
/// use tilecache::config::format_size;
///
/// assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2GB");
/// assert_eq!(format_size(1536 * 1024 * 1024), "1536MB");
/// assert_eq!(format_size(1000), "1000");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes >= GB && bytes % GB == 0 {
        format!("{}GB", bytes / GB)
    } else if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{}KB", bytes / KB)
    } else {
        format!("{}", bytes)
    }
}

/// Byte count that parses from and displays as a human-readable size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Size(pub u64);

impl Size {
    pub fn bytes(self) -> u64 {
        self.0
    }

    pub fn from_gb(gb: u64) -> Self {
        Self(gb * GB)
    }

    pub fn from_mb(mb: u64) -> Self {
        Self(mb * MB)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_size(self.0))
    }
}

impl std::str::FromStr for Size {
    type Err = SizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_size(s).map(Size)
    }
}
