//! Filesystem walks over the cache root.
//!
//! Every walk reflects the tree as it is at call time; nothing is indexed
//! between sweeps. Entries that disappear or cannot be read mid-walk are
//! skipped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

/// One file under the cache root, captured during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheFile {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Last access time, or modification time where access time is unavailable
    pub accessed: SystemTime,
}

impl CacheFile {
    /// Directory containing the file.
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// Aggregate size of a directory tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheUsage {
    /// Number of regular files
    pub file_count: u64,
    /// Sum of file sizes in bytes
    pub total_bytes: u64,
}

/// Sum the sizes of all regular files below `root`.
///
/// Fails only if `root` itself cannot be read; unreadable subdirectories and
/// files are skipped.
pub fn directory_usage(root: &Path) -> io::Result<CacheUsage> {
    let entries = fs::read_dir(root)?;
    let mut usage = CacheUsage::default();
    accumulate_usage(entries, &mut usage);
    Ok(usage)
}

fn accumulate_usage(entries: fs::ReadDir, usage: &mut CacheUsage) {
    for entry in entries.flatten() {
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if let Ok(children) = fs::read_dir(entry.path()) {
                accumulate_usage(children, usage);
            }
        } else if file_type.is_file() {
            if let Ok(metadata) = entry.metadata() {
                usage.file_count += 1;
                usage.total_bytes += metadata.len();
            }
        }
    }
}

/// Collect every regular file below `root`, depth-first.
///
/// Symbolic links are not followed, so a link cannot pull files from outside
/// the cache root into an eviction pass.
pub fn walk_cache_files(root: &Path) -> Vec<CacheFile> {
    let mut files = Vec::new();
    collect_files_recursive(root, &mut files);
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<CacheFile>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(
                dir = %dir.display(),
                error = %e,
                "Failed to read directory during cache walk"
            );
            return;
        }
    };

    for entry in entries.flatten() {
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(_) => continue,
        };
        let path = entry.path();

        if file_type.is_dir() {
            collect_files_recursive(&path, files);
        } else if file_type.is_file() {
            if let Ok(metadata) = entry.metadata() {
                let accessed = metadata
                    .accessed()
                    .or_else(|_| metadata.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                files.push(CacheFile {
                    path,
                    size: metadata.len(),
                    accessed,
                });
            }
        }
    }
}
