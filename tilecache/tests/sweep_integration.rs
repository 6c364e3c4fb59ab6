//! Integration tests for the bounded disk cache.
//!
//! These exercise eviction through the public `BoundedDiskCache` API with
//! access times set explicitly, so results do not depend on mount options.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use filetime::FileTime;
use tempfile::TempDir;
use tilecache::cache::{walk_cache_files, BoundedDiskCache, DiskCacheConfig, MIN_RETAINED_FILES};
use tilecache::log::NoOpLogger;

/// Write `count` files of `size` bytes spread over a few tile-like
/// directories. File `i` gets access time `base + i` seconds, so index order
/// is eviction order.
fn populate(root: &Path, count: usize, size: usize) -> Vec<PathBuf> {
    let base = SystemTime::now() - Duration::from_secs(100_000);
    (0..count)
        .map(|i| {
            let path = root
                .join("earth")
                .join(format!("{}", i % 3))
                .join(format!("{:04}", i % 7))
                .join(format!("{:04}_{:04}.jpg", i % 7, i));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, vec![0u8; size]).unwrap();
            let at = FileTime::from_system_time(base + Duration::from_secs(i as u64));
            filetime::set_file_times(&path, at, at).unwrap();
            path
        })
        .collect()
}

fn open(root: &Path, upper: u64, lower: u64) -> BoundedDiskCache {
    let config = DiskCacheConfig::new(root).with_limits(upper, lower);
    BoundedDiskCache::new(config, Arc::new(NoOpLogger)).unwrap()
}

#[test]
fn test_ten_files_leave_three_newest() {
    let temp_dir = TempDir::new().unwrap();
    let files = populate(temp_dir.path(), 10, 150);
    let cache = open(temp_dir.path(), 1000, 500);

    let report = cache.sweep().unwrap();

    assert!(report.evicted);
    assert_eq!(report.files_deleted, 7);
    assert_eq!(report.bytes_freed, 1050);
    assert_eq!(report.size_after, 450);
    for (i, path) in files.iter().enumerate() {
        assert_eq!(path.exists(), i >= 7, "file {} presence", i);
    }
}

#[test]
fn test_fifty_files_stop_on_lower_bound() {
    let temp_dir = TempDir::new().unwrap();
    let files = populate(temp_dir.path(), 50, 100);
    let cache = open(temp_dir.path(), 4000, 1000);

    let report = cache.sweep().unwrap();

    assert_eq!(report.files_deleted, 40);
    assert_eq!(cache.usage().unwrap().total_bytes, 1000);
    assert!(files[..40].iter().all(|p| !p.exists()));
    assert!(files[40..].iter().all(|p| p.exists()));
}

#[test]
fn test_large_sweep_keeps_retention_floor() {
    let temp_dir = TempDir::new().unwrap();
    let files = populate(temp_dir.path(), 150, 10);
    // Reaching the lower bound would leave 10 files; the floor keeps 100.
    let cache = open(temp_dir.path(), 1000, 100);

    let report = cache.sweep().unwrap();

    assert_eq!(report.files_scanned, 150);
    assert_eq!(report.files_deleted, 50);
    assert_eq!(
        walk_cache_files(temp_dir.path()).len(),
        MIN_RETAINED_FILES
    );
    assert!(files[..50].iter().all(|p| !p.exists()));
    assert!(files[50..].iter().all(|p| p.exists()));
}

#[test]
fn test_at_upper_bound_is_untouched() {
    let temp_dir = TempDir::new().unwrap();
    populate(temp_dir.path(), 10, 100);
    let cache = open(temp_dir.path(), 1000, 0);

    let report = cache.sweep().unwrap();

    assert!(!report.evicted);
    assert_eq!(cache.usage().unwrap().file_count, 10);
}

#[test]
fn test_emptied_directories_are_pruned_but_root_stays() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("cache");
    populate(&root, 20, 100);
    let cache = open(&root, 500, 0);

    cache.sweep().unwrap();

    assert!(root.is_dir());
    assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
}

#[test]
fn test_sweep_after_external_deletion() {
    let temp_dir = TempDir::new().unwrap();
    let files = populate(temp_dir.path(), 10, 150);
    let cache = open(temp_dir.path(), 1000, 500);
    fs::remove_file(&files[0]).unwrap();

    // 1350 bytes remain; the sweep removes the next-oldest files.
    let report = cache.sweep().unwrap();

    assert!(report.evicted);
    assert!(report.size_after <= 500);
    assert!(files[9].exists());
}

#[test]
fn test_background_maintenance_enforces_bound() {
    let temp_dir = TempDir::new().unwrap();
    populate(temp_dir.path(), 30, 100);
    let cache = open(temp_dir.path(), 1000, 500);

    cache
        .start_maintenance_with(Duration::ZERO, Duration::from_millis(50))
        .unwrap();
    assert!(cache.is_maintaining());

    let deadline = Instant::now() + Duration::from_secs(5);
    while cache.usage().unwrap().total_bytes > 500 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    cache.stop_maintenance();

    assert!(!cache.is_maintaining());
    assert!(cache.usage().unwrap().total_bytes <= 500);
    let stats = cache.stats();
    assert!(stats.evicting_sweeps >= 1);
    assert_eq!(stats.sweep_failures, 0);
}

#[test]
fn test_maintenance_survives_missing_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("cache");
    let cache = open(&root, 1000, 500);
    fs::remove_dir(&root).unwrap();

    cache
        .start_maintenance_with(Duration::ZERO, Duration::from_millis(20))
        .unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while cache.stats().sweep_failures < 2 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }

    // Failures are counted and the schedule keeps going.
    assert!(cache.stats().sweep_failures >= 2);
    assert!(cache.is_maintaining());
}
