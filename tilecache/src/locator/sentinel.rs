//! Bad-tile sentinel files.
//!
//! When a download fails the downloader leaves `<tile path>.txt` next to where
//! the tile would have been. While the sentinel is younger than the retry
//! backoff the locator reports the tile as unavailable instead of asking for
//! it again. The sentinel's age is its modification time; the body records
//! the failure for people reading the cache by hand.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};

/// Suffix appended to the tile path to form the sentinel path.
pub const SENTINEL_SUFFIX: &str = ".txt";

/// Marker for a failed download of one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadTileSentinel {
    path: PathBuf,
}

impl BadTileSentinel {
    /// Sentinel belonging to the tile at `target`.
    pub fn for_target(target: &Path) -> Self {
        let mut path: OsString = target.as_os_str().to_owned();
        path.push(SENTINEL_SUFFIX);
        Self {
            path: PathBuf::from(path),
        }
    }

    /// Location of the sentinel file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the sentinel currently exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// When the failure was recorded, from the file's modification time.
    pub fn written_at(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    /// Age of the sentinel at `now`, or `None` when there is no sentinel.
    pub fn age(&self, now: SystemTime) -> Option<Duration> {
        self.written_at()
            .map(|written| crate::time::age(now, written))
    }

    /// Whether the sentinel exists and is younger than `backoff`.
    pub fn is_active(&self, now: SystemTime, backoff: Duration) -> bool {
        matches!(self.age(now), Some(age) if age < backoff)
    }

    /// Record a failure, creating parent directories as needed.
    pub fn write(&self, reason: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = format!(
            "failed_at={}\nreason={}\n",
            Utc::now().to_rfc3339(),
            reason.replace('\n', " ")
        );
        fs::write(&self.path, body)
    }

    /// Failure time recorded in the sentinel body, if readable.
    pub fn recorded_failure(&self) -> Option<DateTime<Utc>> {
        let body = fs::read_to_string(&self.path).ok()?;
        body.lines()
            .find_map(|line| line.strip_prefix("failed_at="))
            .and_then(|value| DateTime::parse_from_rfc3339(value.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Delete the sentinel. A sentinel that is already gone is not an error.
    pub fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn set_age(path: &Path, age: Duration) {
        let time = SystemTime::now() - age;
        filetime::set_file_mtime(path, filetime::FileTime::from_system_time(time)).unwrap();
    }

    #[test]
    fn test_path_appends_suffix() {
        let sentinel = BadTileSentinel::for_target(Path::new("/c/earth/3/0001/0001_0002.jpg"));
        assert_eq!(
            sentinel.path(),
            Path::new("/c/earth/3/0001/0001_0002.jpg.txt")
        );
    }

    #[test]
    fn test_missing_sentinel() {
        let temp_dir = TempDir::new().unwrap();
        let sentinel = BadTileSentinel::for_target(&temp_dir.path().join("t.jpg"));

        assert!(!sentinel.exists());
        assert!(sentinel.age(SystemTime::now()).is_none());
        assert!(!sentinel.is_active(SystemTime::now(), Duration::from_secs(3600)));
        assert!(sentinel.remove().is_ok());
    }

    #[test]
    fn test_write_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("earth/3/0001/0001_0002.jpg");
        let sentinel = BadTileSentinel::for_target(&target);

        let before = Utc::now() - chrono::Duration::seconds(1);
        sentinel.write("HTTP 404\nnot found").unwrap();

        assert!(sentinel.exists());
        let recorded = sentinel.recorded_failure().unwrap();
        assert!(recorded >= before);
        let body = fs::read_to_string(sentinel.path()).unwrap();
        assert!(body.contains("reason=HTTP 404 not found"));
    }

    #[test]
    fn test_fresh_sentinel_is_active() {
        let temp_dir = TempDir::new().unwrap();
        let sentinel = BadTileSentinel::for_target(&temp_dir.path().join("t.jpg"));
        sentinel.write("timeout").unwrap();

        assert!(sentinel.is_active(SystemTime::now(), Duration::from_secs(24 * 3600)));
    }

    #[test]
    fn test_old_sentinel_is_inactive() {
        let temp_dir = TempDir::new().unwrap();
        let sentinel = BadTileSentinel::for_target(&temp_dir.path().join("t.jpg"));
        sentinel.write("timeout").unwrap();
        set_age(sentinel.path(), Duration::from_secs(25 * 3600));

        let age = sentinel.age(SystemTime::now()).unwrap();
        assert!(age >= Duration::from_secs(25 * 3600));
        assert!(!sentinel.is_active(SystemTime::now(), Duration::from_secs(24 * 3600)));
    }

    #[test]
    fn test_remove_deletes_file() {
        let temp_dir = TempDir::new().unwrap();
        let sentinel = BadTileSentinel::for_target(&temp_dir.path().join("t.jpg"));
        sentinel.write("x").unwrap();

        sentinel.remove().unwrap();
        assert!(!sentinel.exists());
    }

    #[test]
    fn test_unparseable_body() {
        let temp_dir = TempDir::new().unwrap();
        let sentinel = BadTileSentinel::for_target(&temp_dir.path().join("t.jpg"));
        fs::write(sentinel.path(), "").unwrap();

        assert!(sentinel.exists());
        assert!(sentinel.recorded_failure().is_none());
    }
}
