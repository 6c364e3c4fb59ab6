//! Per-tile-set resolution policy.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::address::TileAddress;
use super::extension::ImageExtension;

/// Settings shared by every tile of one imagery set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSet {
    /// Set name, used in logs and download requests
    pub name: String,
    /// Directory under each base directory holding this set's tiles
    pub directory: PathBuf,
    /// Extension tiles are fetched and stored as
    pub extension: ImageExtension,
    /// Age after which a cached tile is refreshed in the background
    pub expiration: Option<Duration>,
    /// Whether missing tiles may be downloaded
    pub downloadable: bool,
    /// Source URL template with `{level}`, `{row}`, `{col}` and `{ext}`
    /// placeholders
    pub url_template: Option<String>,
}

impl TileSet {
    /// Create a downloadable tile set stored under a directory named after it.
    pub fn new(name: impl Into<String>, extension: ImageExtension) -> Self {
        let name = name.into();
        Self {
            directory: PathBuf::from(&name),
            name,
            extension,
            expiration: None,
            downloadable: true,
            url_template: None,
        }
    }

    /// Store tiles under `directory` instead of the set name.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Refresh cached tiles older than `expiration`.
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Allow or forbid downloads for this set.
    pub fn with_downloadable(mut self, downloadable: bool) -> Self {
        self.downloadable = downloadable;
        self
    }

    /// Set the source URL template.
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = Some(template.into());
        self
    }

    /// This set's directory under `base`.
    pub fn base_in(&self, base: &Path) -> PathBuf {
        base.join(&self.directory)
    }

    /// Render the source URL for a tile, if a template is configured.
    pub fn source_url(&self, address: &TileAddress) -> Option<String> {
        self.url_template.as_ref().map(|template| {
            template
                .replace("{level}", &address.level.to_string())
                .replace("{row}", &address.row.to_string())
                .replace("{col}", &address.col.to_string())
                .replace("{ext}", self.extension.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let set = TileSet::new("bluemarble", ImageExtension::Jpg);
        assert_eq!(set.name, "bluemarble");
        assert_eq!(set.directory, PathBuf::from("bluemarble"));
        assert!(set.downloadable);
        assert!(set.expiration.is_none());
        assert!(set.url_template.is_none());
    }

    #[test]
    fn test_builder() {
        let set = TileSet::new("terrain", ImageExtension::Png)
            .with_directory("srtm/v2")
            .with_expiration(Duration::from_secs(3600))
            .with_downloadable(false);

        assert_eq!(set.directory, PathBuf::from("srtm/v2"));
        assert_eq!(set.expiration, Some(Duration::from_secs(3600)));
        assert!(!set.downloadable);
        assert_eq!(
            set.base_in(Path::new("/cache")),
            PathBuf::from("/cache/srtm/v2")
        );
    }

    #[test]
    fn test_source_url_rendering() {
        let set = TileSet::new("earth", ImageExtension::Jpg)
            .with_url_template("https://tiles.example.org/{level}/{row}/{col}.{ext}");
        let url = set.source_url(&TileAddress::new(4, 11, 6)).unwrap();
        assert_eq!(url, "https://tiles.example.org/4/11/6.jpg");
    }

    #[test]
    fn test_source_url_without_template() {
        let set = TileSet::new("earth", ImageExtension::Jpg);
        assert!(set.source_url(&TileAddress::new(1, 1, 1)).is_none());
    }
}
