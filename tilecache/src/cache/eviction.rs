//! Least-recently-accessed eviction over the cache tree.
//!
//! A sweep measures the tree, and only when it holds more than the upper
//! bound does it list every file and delete oldest-access-first until the
//! tree is at or below the lower bound.
//!
//! # Retention floor
//!
//! When a sweep starts with more than [`MIN_RETAINED_FILES`] candidates it
//! never takes the candidate count below that floor, even if the lower bound
//! has not been reached. This stops a tree of many tiny files from being
//! emptied by a single sweep. A sweep that starts with fewer candidates is
//! bounded by the lower limit alone.
//!
//! Candidates that could not be deleted still count as retained, so the
//! floor is measured against files left on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::walk::{directory_usage, walk_cache_files, CacheFile};

/// Candidate count below which a sweep stops evicting.
pub const MIN_RETAINED_FILES: usize = 100;

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Whether the upper bound was exceeded and eviction ran
    pub evicted: bool,
    /// Bytes under the root when the sweep started
    pub size_before: u64,
    /// Running total after the last deletion
    pub size_after: u64,
    /// Candidate files listed for eviction
    pub files_scanned: usize,
    /// Files deleted by this sweep
    pub files_deleted: usize,
    /// Candidates that were already gone when their turn came
    pub files_vanished: usize,
    /// Candidates that could not be deleted (locked, permission denied)
    pub delete_failures: usize,
    /// Bytes removed from the running total
    pub bytes_freed: u64,
    /// Eviction ended early because maintenance was stopped
    pub interrupted: bool,
    /// Wall time spent in the sweep
    pub duration: Duration,
}

/// Result of clearing the whole cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// Files deleted
    pub files_deleted: usize,
    /// Bytes freed
    pub bytes_freed: u64,
}

/// Run one sweep over `root`.
///
/// `should_stop` is polled between deletions; returning `true` ends the
/// eviction loop with `interrupted` set. Every deletion is complete on its
/// own, so stopping between any two leaves a consistent tree.
///
/// Fails only if `root` itself cannot be measured.
pub(crate) fn sweep_directory(
    root: &Path,
    upper_limit: u64,
    lower_limit: u64,
    should_stop: &dyn Fn() -> bool,
) -> io::Result<SweepReport> {
    let start = Instant::now();
    let usage = directory_usage(root)?;

    if usage.total_bytes <= upper_limit {
        debug!(
            size_bytes = usage.total_bytes,
            upper_limit_bytes = upper_limit,
            "Disk cache under limit, no eviction needed"
        );
        return Ok(SweepReport {
            size_before: usage.total_bytes,
            size_after: usage.total_bytes,
            duration: start.elapsed(),
            ..Default::default()
        });
    }

    info!(
        current_size_bytes = usage.total_bytes,
        upper_limit_bytes = upper_limit,
        lower_limit_bytes = lower_limit,
        file_count = usage.file_count,
        "Disk cache over limit, starting eviction"
    );

    let mut candidates = walk_cache_files(root);
    // Stable sort: equal access times keep walk order.
    candidates.sort_by_key(|file| file.accessed);

    let mut report = evict_oldest(root, candidates, usage.total_bytes, lower_limit, should_stop);
    report.duration = start.elapsed();

    if report.size_after > lower_limit && !report.interrupted {
        warn!(
            remaining_size = report.size_after,
            lower_limit = lower_limit,
            shortfall_bytes = report.size_after - lower_limit,
            "Eviction stopped above the lower limit"
        );
    }

    Ok(report)
}

/// Delete candidates (sorted oldest first) until the running total reaches
/// `lower_limit` or the retention floor is hit.
fn evict_oldest(
    root: &Path,
    candidates: Vec<CacheFile>,
    current_size: u64,
    lower_limit: u64,
    should_stop: &dyn Fn() -> bool,
) -> SweepReport {
    let files_scanned = candidates.len();
    let floor = if files_scanned > MIN_RETAINED_FILES {
        MIN_RETAINED_FILES
    } else {
        0
    };

    let mut report = SweepReport {
        evicted: true,
        size_before: current_size,
        files_scanned,
        ..Default::default()
    };
    let mut remaining_size = current_size;
    let mut remaining_files = files_scanned;

    for file in candidates {
        if remaining_size <= lower_limit || remaining_files <= floor {
            break;
        }
        if should_stop() {
            report.interrupted = true;
            break;
        }

        match fs::remove_file(&file.path) {
            Ok(()) => {
                remaining_files -= 1;
                remaining_size = remaining_size.saturating_sub(file.size);
                report.bytes_freed += file.size;
                report.files_deleted += 1;
                prune_empty_ancestors(root, file.parent());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Removed by someone else since the walk; its bytes are gone.
                remaining_files -= 1;
                remaining_size = remaining_size.saturating_sub(file.size);
                report.bytes_freed += file.size;
                report.files_vanished += 1;
                prune_empty_ancestors(root, file.parent());
            }
            Err(e) => {
                report.delete_failures += 1;
                debug!(
                    path = %file.path.display(),
                    error = %e,
                    "Failed to delete cache file during eviction"
                );
            }
        }

        std::thread::yield_now();
    }

    if report.delete_failures > 0 {
        info!(
            delete_failures = report.delete_failures,
            "Some files could not be deleted during eviction"
        );
    }

    report.size_after = remaining_size;
    report
}

/// Remove `start` and each parent while they are empty, stopping at the first
/// non-empty directory or at `root`, which is never removed.
pub(crate) fn prune_empty_ancestors(root: &Path, start: Option<&Path>) {
    let mut current: Option<PathBuf> = start.map(Path::to_path_buf);

    while let Some(dir) = current {
        if dir == root || !dir.starts_with(root) {
            break;
        }
        // Fails on a non-empty directory, which ends the walk.
        if fs::remove_dir(&dir).is_err() {
            break;
        }
        current = dir.parent().map(Path::to_path_buf);
    }
}

/// Delete every file under `root`, keeping `root` itself.
pub(crate) fn clear_directory(root: &Path) -> ClearReport {
    let mut report = ClearReport::default();

    for file in walk_cache_files(root) {
        if fs::remove_file(&file.path).is_ok() {
            report.files_deleted += 1;
            report.bytes_freed += file.size;
        }
        prune_empty_ancestors(root, file.parent());
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use tempfile::TempDir;

    /// Create a file of `size` bytes whose access and modification times are
    /// `age_secs` in the past.
    fn create_test_file(path: &Path, size: usize, age_secs: u64) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, vec![0u8; size]).unwrap();

        let time = SystemTime::now() - Duration::from_secs(age_secs);
        let ft = filetime::FileTime::from_system_time(time);
        filetime::set_file_times(path, ft, ft).unwrap();
    }

    fn never() -> bool {
        false
    }

    #[test]
    fn test_under_upper_limit_deletes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(&root.join("a.jpg"), 400, 30);
        create_test_file(&root.join("b.jpg"), 600, 20);

        let report = sweep_directory(root, 1000, 100, &never).unwrap();

        assert!(!report.evicted);
        assert_eq!(report.files_deleted, 0);
        assert_eq!(report.size_before, 1000);
        assert!(root.join("a.jpg").exists());
        assert!(root.join("b.jpg").exists());
    }

    #[test]
    fn test_evict_oldest_first() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        create_test_file(&root.join("oldest.jpg"), 1000, 300);
        create_test_file(&root.join("middle.jpg"), 1000, 200);
        create_test_file(&root.join("newest.jpg"), 1000, 100);

        let report = sweep_directory(root, 2500, 2000, &never).unwrap();

        assert!(report.evicted);
        assert_eq!(report.files_deleted, 1);
        assert_eq!(report.bytes_freed, 1000);
        assert_eq!(report.size_after, 2000);
        assert!(!root.join("oldest.jpg").exists());
        assert!(root.join("middle.jpg").exists());
        assert!(root.join("newest.jpg").exists());
    }

    #[test]
    fn test_ten_files_evicted_down_to_lower_limit() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        // file1 is the oldest access, file10 the newest
        for i in 1..=10u64 {
            create_test_file(&root.join(format!("file{}.jpg", i)), 150, (11 - i) * 60);
        }

        let report = sweep_directory(root, 1000, 500, &never).unwrap();

        assert_eq!(report.size_before, 1500);
        assert_eq!(report.files_deleted, 7);
        assert_eq!(report.bytes_freed, 1050);
        assert_eq!(report.size_after, 450);
        for i in 1..=7 {
            assert!(!root.join(format!("file{}.jpg", i)).exists(), "file{}", i);
        }
        for i in 8..=10 {
            assert!(root.join(format!("file{}.jpg", i)).exists(), "file{}", i);
        }
    }

    #[test]
    fn test_retention_floor_stops_eviction() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        for i in 0..150u64 {
            create_test_file(&root.join(format!("tiny{:03}.jpg", i)), 10, 1000 - i);
        }

        // Lower limit of zero would empty the tree without the floor
        let report = sweep_directory(root, 100, 0, &never).unwrap();

        assert_eq!(report.files_scanned, 150);
        assert_eq!(report.files_deleted, 50);
        assert_eq!(walk_cache_files(root).len(), MIN_RETAINED_FILES);
        // The fifty oldest are gone
        assert!(!root.join("tiny000.jpg").exists());
        assert!(!root.join("tiny049.jpg").exists());
        assert!(root.join("tiny050.jpg").exists());
    }

    #[test]
    fn test_interrupted_sweep_stops_between_deletions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for i in 0..5u64 {
            create_test_file(&root.join(format!("f{}.jpg", i)), 100, 100 - i);
        }

        let report = sweep_directory(root, 100, 0, &|| true).unwrap();

        assert!(report.interrupted);
        assert_eq!(report.files_deleted, 0);
        assert_eq!(walk_cache_files(root).len(), 5);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone");
        assert!(sweep_directory(&missing, 0, 0, &never).is_err());
    }

    #[test]
    fn test_vanished_candidate_counts_as_freed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let ghost = CacheFile {
            path: root.join("ghost.jpg"),
            size: 300,
            accessed: SystemTime::UNIX_EPOCH,
        };

        let report = evict_oldest(root, vec![ghost], 300, 0, &never);

        assert_eq!(report.files_vanished, 1);
        assert_eq!(report.files_deleted, 0);
        assert_eq!(report.size_after, 0);
    }

    #[test]
    fn test_failed_delete_counts_toward_retention_floor() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        // A directory named like a tile cannot be removed with remove_file
        let stuck = root.join("stuck.jpg");
        fs::create_dir(&stuck).unwrap();
        let mut candidates = vec![CacheFile {
            path: stuck.clone(),
            size: 10,
            accessed: SystemTime::UNIX_EPOCH,
        }];
        for i in 0..101u64 {
            let path = root.join(format!("tiny{:03}.jpg", i));
            create_test_file(&path, 10, 1000 - i);
            candidates.push(CacheFile {
                path,
                size: 10,
                accessed: SystemTime::now() - Duration::from_secs(1000 - i),
            });
        }

        let report = evict_oldest(root, candidates, 1020, 0, &never);

        assert_eq!(report.delete_failures, 1);
        assert_eq!(report.files_deleted, 2);
        assert!(stuck.is_dir());
        // The floor holds against what is left: 99 tiles plus the stuck entry
        assert_eq!(walk_cache_files(root).len() + 1, MIN_RETAINED_FILES);
        assert!(!root.join("tiny000.jpg").exists());
        assert!(!root.join("tiny001.jpg").exists());
        assert!(root.join("tiny002.jpg").exists());
    }

    #[test]
    fn test_prune_removes_empty_chain_but_not_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let leaf = root.join("earth/4/0003");
        fs::create_dir_all(&leaf).unwrap();

        prune_empty_ancestors(root, Some(&leaf));

        assert!(!root.join("earth").exists());
        assert!(root.exists());
    }

    #[test]
    fn test_prune_stops_at_non_empty_ancestor() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let leaf = root.join("earth/4/0003");
        fs::create_dir_all(&leaf).unwrap();
        fs::write(root.join("earth/4/keep.jpg"), b"x").unwrap();

        prune_empty_ancestors(root, Some(&leaf));

        assert!(!leaf.exists());
        assert!(root.join("earth/4").exists());
        assert!(root.join("earth/4/keep.jpg").exists());
    }

    #[test]
    fn test_prune_ignores_paths_outside_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("cache");
        let outside = temp_dir.path().join("other");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&outside).unwrap();

        prune_empty_ancestors(&root, Some(&outside));

        assert!(outside.exists());
    }

    #[test]
    fn test_sweep_removes_emptied_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(&root.join("earth/2/0001/0001_0001.jpg"), 500, 500);
        create_test_file(&root.join("earth/2/0002/0002_0001.jpg"), 500, 10);

        let report = sweep_directory(root, 600, 500, &never).unwrap();

        assert_eq!(report.files_deleted, 1);
        assert!(!root.join("earth/2/0001").exists());
        assert!(root.join("earth/2/0002/0002_0001.jpg").exists());
    }

    #[test]
    fn test_clear_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(&root.join("a/1.jpg"), 100, 0);
        create_test_file(&root.join("b/c/2.jpg"), 200, 0);

        let report = clear_directory(root);

        assert_eq!(report.files_deleted, 2);
        assert_eq!(report.bytes_freed, 300);
        assert!(root.exists());
        assert!(fs::read_dir(root).unwrap().next().is_none());
    }

    #[test]
    fn test_sweep_report_default() {
        let report = SweepReport::default();
        assert!(!report.evicted);
        assert_eq!(report.files_deleted, 0);
        assert_eq!(report.bytes_freed, 0);
        assert_eq!(report.duration, Duration::ZERO);
    }
}
