//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory tree
//! and collecting the size of every regular file for duplicate detection.
//! Directory reads run in parallel on jwalk's rayon pool, but entries are
//! yielded in a stable, name-sorted depth-first order so that a static tree
//! always produces the same sequence.
//!
//! # Features
//!
//! - Deterministic (sorted) traversal
//! - Symlinks skipped by default, optionally followed
//! - Per-entry errors yielded as values, never stopping iteration
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};
use crate::progress::ProgressCallback;

/// Directory walker for file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback, ticked once per file found
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Returns an iterator over [`FileEntry`] results. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration. Only regular
    /// files are yielded; directories are descended into.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(false)
            .sort(true);

        let mut found = 0usize;

        walk_dir
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| {
                let result = match entry_result {
                    Ok(entry) => {
                        let path = entry.path();

                        // Skip the root directory itself
                        if path == self.root {
                            return None;
                        }

                        let file_type = entry.file_type();
                        if file_type.is_dir() {
                            return None;
                        }

                        let is_symlink = file_type.is_symlink();
                        if is_symlink && !self.config.follow_symlinks {
                            log::trace!("Skipping symlink: {}", path.display());
                            return None;
                        }

                        self.stat_file(path)?
                    }
                    Err(e) => {
                        let path = e
                            .path()
                            .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                        log::warn!("Walker error for {}: {}", path.display(), e);
                        Err(ScanError::Io {
                            path,
                            source: std::io::Error::other(e.to_string()),
                        })
                    }
                };

                if let (Ok(file), Some(callback)) = (&result, &self.progress_callback) {
                    found += 1;
                    callback.on_progress(found, file.path.to_string_lossy().as_ref());
                }

                Some(result)
            })
    }

    /// Stat a candidate entry. Returns `None` for anything that is not a
    /// regular file once symlinks are resolved as configured.
    fn stat_file(&self, path: PathBuf) -> Option<Result<FileEntry, ScanError>> {
        let metadata = if self.config.follow_symlinks {
            std::fs::metadata(&path)
        } else {
            std::fs::symlink_metadata(&path)
        };

        let metadata = match metadata {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_io_error(&path, e))),
        };

        if !metadata.is_file() {
            log::trace!("Skipping non-regular file: {}", path.display());
            return None;
        }

        Some(Ok(FileEntry::new(path, metadata.len())))
    }

    /// Classify and log I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            ErrorKind::NotFound => {
                log::warn!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    /// Create a test directory with some files.
    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        let mut f = File::create(dir.path().join("file1.txt")).unwrap();
        writeln!(f, "Hello, world!").unwrap();

        let mut f = File::create(dir.path().join("file2.txt")).unwrap();
        writeln!(f, "Another file").unwrap();

        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();

        let mut f = File::create(subdir.join("nested.txt")).unwrap();
        writeln!(f, "Nested file content").unwrap();

        dir
    }

    fn names(files: &[FileEntry]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_walker_finds_files() {
        let dir = create_test_dir();
        let walker = Walker::new(dir.path(), WalkerConfig::default());

        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 3);
        for file in &files {
            assert!(file.size > 0);
            assert!(file.path.is_file());
        }
    }

    #[test]
    fn test_walker_records_sizes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ten.bin"), [0u8; 10]).unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files, vec![FileEntry::new(dir.path().join("ten.bin"), 10)]);
    }

    #[test]
    fn test_walker_includes_empty_files() {
        let dir = create_test_dir();
        File::create(dir.path().join("empty.txt")).unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert!(files.iter().any(|f| f.size == 0));
        assert_eq!(files.len(), 4);
    }

    #[test]
    fn test_walker_includes_hidden_files() {
        let dir = create_test_dir();
        fs::write(dir.path().join(".hidden"), b"Hidden content").unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert!(names(&files).contains(&".hidden".to_string()));
    }

    #[test]
    fn test_walker_order_is_deterministic() {
        let dir = create_test_dir();
        for name in ["zeta.txt", "alpha.txt", "mid.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let first: Vec<_> = walker.walk().filter_map(Result::ok).collect();
        let second: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(first, second);

        let top_level: Vec<_> = names(&first)
            .into_iter()
            .filter(|n| n != "nested.txt")
            .collect();
        let mut sorted = top_level.clone();
        sorted.sort();
        assert_eq!(top_level, sorted);
    }

    #[test]
    fn test_walker_shutdown_flag() {
        let dir = create_test_dir();
        for i in 0..10 {
            fs::write(dir.path().join(format!("file{i}.bin")), format!("Content {i}")).unwrap();
        }

        let shutdown = Arc::new(AtomicBool::new(true));
        let walker = Walker::new(dir.path(), WalkerConfig::default())
            .with_shutdown_flag(Arc::clone(&shutdown));

        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert!(files.is_empty());
    }

    #[test]
    fn test_walker_handles_nonexistent_path() {
        let walker = Walker::new(
            Path::new("/nonexistent/path/12345"),
            WalkerConfig::default(),
        );

        let results: Vec<_> = walker.walk().collect();

        // Should produce errors, not panic
        assert!(results.iter().all(|r| r.is_err()));
    }

    #[test]
    #[cfg(unix)]
    fn test_walker_skips_symlinks_by_default() {
        let dir = create_test_dir();
        std::os::unix::fs::symlink(dir.path().join("file1.txt"), dir.path().join("link.txt"))
            .unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert!(!names(&files).contains(&"link.txt".to_string()));
        assert_eq!(files.len(), 3);
    }

    #[test]
    #[cfg(unix)]
    fn test_walker_follows_symlinks_when_configured() {
        let dir = create_test_dir();
        std::os::unix::fs::symlink(dir.path().join("file1.txt"), dir.path().join("link.txt"))
            .unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::new(true));
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        let link = files
            .iter()
            .find(|f| f.path.file_name().unwrap() == "link.txt")
            .expect("symlink should be reported when following");
        assert_eq!(link.size, fs::metadata(dir.path().join("file1.txt")).unwrap().len());
    }

    #[test]
    #[cfg(unix)]
    fn test_walker_skips_broken_symlink_by_default() {
        let dir = create_test_dir();
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling"))
            .unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let results: Vec<_> = walker.walk().collect();

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(results.len(), 3);
    }
}
