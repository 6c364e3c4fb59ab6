//! Recognized image file extensions.

use std::fmt;
use std::str::FromStr;

/// An image format a tile may be stored as.
///
/// Declaration order is priority order: when the same tile exists under
/// several extensions, the earliest variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageExtension {
    Jpg,
    Jpeg,
    Png,
    Dds,
    Bmp,
    Gif,
    Tif,
    Tiff,
    Webp,
}

/// Every recognized extension, in priority order.
pub const RECOGNIZED_EXTENSIONS: [ImageExtension; 9] = [
    ImageExtension::Jpg,
    ImageExtension::Jpeg,
    ImageExtension::Png,
    ImageExtension::Dds,
    ImageExtension::Bmp,
    ImageExtension::Gif,
    ImageExtension::Tif,
    ImageExtension::Tiff,
    ImageExtension::Webp,
];

impl ImageExtension {
    /// Extension text without the leading dot.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageExtension::Jpg => "jpg",
            ImageExtension::Jpeg => "jpeg",
            ImageExtension::Png => "png",
            ImageExtension::Dds => "dds",
            ImageExtension::Bmp => "bmp",
            ImageExtension::Gif => "gif",
            ImageExtension::Tif => "tif",
            ImageExtension::Tiff => "tiff",
            ImageExtension::Webp => "webp",
        }
    }

    /// Exact, case-insensitive match against the allow-list.
    ///
    /// A leading dot is accepted. Partial matches such as `"jp"` or
    /// `"png.txt"` are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('.').unwrap_or(s);
        RECOGNIZED_EXTENSIONS
            .iter()
            .copied()
            .find(|ext| ext.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageExtension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let allowed: Vec<&str> = RECOGNIZED_EXTENSIONS.iter().map(|e| e.as_str()).collect();
            format!(
                "unrecognized image extension '{}', expected one of: {}",
                s,
                allowed.join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_match() {
        assert_eq!(ImageExtension::parse("jpg"), Some(ImageExtension::Jpg));
        assert_eq!(ImageExtension::parse("PNG"), Some(ImageExtension::Png));
        assert_eq!(ImageExtension::parse(".dds"), Some(ImageExtension::Dds));
        assert_eq!(ImageExtension::parse(" tiff "), Some(ImageExtension::Tiff));
    }

    #[test]
    fn test_parse_rejects_substrings() {
        assert_eq!(ImageExtension::parse("jp"), None);
        assert_eq!(ImageExtension::parse("tif.txt"), None);
        assert_eq!(ImageExtension::parse("txt"), None);
        assert_eq!(ImageExtension::parse(""), None);
    }

    #[test]
    fn test_priority_order_matches_declaration() {
        let mut sorted = RECOGNIZED_EXTENSIONS;
        sorted.sort();
        assert_eq!(sorted, RECOGNIZED_EXTENSIONS);
        assert_eq!(RECOGNIZED_EXTENSIONS[0], ImageExtension::Jpg);
    }

    #[test]
    fn test_from_str_error_lists_allowed() {
        let err = "xyz".parse::<ImageExtension>().unwrap_err();
        assert!(err.contains("xyz"));
        assert!(err.contains("jpg"));
        assert!(err.contains("webp"));
    }

    #[test]
    fn test_round_trip_display() {
        for ext in RECOGNIZED_EXTENSIONS {
            assert_eq!(ext.to_string().parse::<ImageExtension>().unwrap(), ext);
        }
    }
}
