//! Duplicate finder implementation with two-pass detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Size pass**: walk the tree and group files by size (see [`crate::duplicates::groups`])
//! 2. **Digest pass**: stream the full content of same-size files through BLAKE3
//!    and regroup by digest
//! 3. **Verification** (optional, paranoid mode): compare digest matches byte for byte
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{Walker, WalkerConfig, FileEntry, Hasher};
//! use dupfind::duplicates::{group_by_size, group_by_digest, HashConfig};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let files: Vec<FileEntry> = walker.walk().filter_map(Result::ok).collect();
//! let (size_groups, _) = group_by_size(files);
//!
//! let hasher = Arc::new(Hasher::new());
//! let (digest_groups, stats) = group_by_digest(size_groups, hasher, HashConfig::default());
//!
//! println!("{} digest groups, {} files hashed", digest_groups.len(), stats.hashed_files);
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{group_by_size, DigestGroups, DuplicateGroup, GroupingStats, SizeGroups};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_VERIFYING, PHASE_WALKING};
use crate::scanner::{
    files_identical, hash_to_hex, FileEntry, Hash, HashError, Hasher, ScanError, Walker,
    WalkerConfig, DEFAULT_BUFFER_SIZE,
};

/// Default number of hashing threads.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Run `job` on a dedicated pool of `threads` workers.
///
/// Falls back to the global rayon pool if the dedicated one cannot be built.
fn run_in_pool<T, F>(threads: usize, job: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(job),
        Err(e) => {
            log::warn!(
                "Failed to create hashing pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            job()
        }
    }
}

// ============================================================================
// Digest pass
// ============================================================================

/// Configuration for the digest pass.
#[derive(Clone)]
pub struct HashConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl HashConfig {
    /// Set the number of hashing threads (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
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
}

/// Statistics from the digest pass.
#[derive(Debug, Default)]
pub struct HashStats {
    /// Total files that entered the digest pass
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files that failed to hash (I/O errors)
    pub failed_files: usize,
    /// Errors encountered while hashing, one per failed file
    pub errors: Vec<HashError>,
    /// Total bytes hashed across all files
    pub bytes_hashed: u64,
    /// Number of digest groups with 2+ files
    pub digest_groups: usize,
    /// Number of hashed files dropped because their digest was unique
    pub eliminated_unique: usize,
    /// Whether the pass was interrupted by shutdown
    pub interrupted: bool,
}

impl HashStats {
    /// Percentage of input files that did not end up in a digest group.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.input_files == 0 {
            0.0
        } else {
            let dropped = self.eliminated_unique + self.failed_files;
            (dropped as f64 / self.input_files as f64) * 100.0
        }
    }
}

/// Regroup size groups by full-content digest (second pass).
///
/// Every file of every size group is hashed by exactly one worker of a pool of
/// `config.io_threads` threads. Results are collected in input order and the
/// calling thread alone builds the digest map, so digest keys appear in the
/// order they were first seen and members keep size-group order.
///
/// A file that cannot be opened or read contributes no digest; its error is
/// recorded in [`HashStats::errors`] and the pass continues. Groups with fewer
/// than two members are dropped.
///
/// If shutdown is requested, [`HashStats::interrupted`] is set and the
/// returned map is empty.
///
/// # Example
///
/// ```
/// use dupfind::duplicates::{group_by_digest, HashConfig, SizeGroups};
/// use dupfind::scanner::Hasher;
/// use std::sync::Arc;
///
/// let (groups, stats) = group_by_digest(SizeGroups::new(), Arc::new(Hasher::new()), HashConfig::default());
/// assert!(groups.is_empty());
/// assert_eq!(stats.input_files, 0);
/// ```
#[must_use]
pub fn group_by_digest(
    size_groups: SizeGroups,
    hasher: Arc<Hasher>,
    config: HashConfig,
) -> (DigestGroups, HashStats) {
    let all_files: Vec<FileEntry> = size_groups.into_values().flatten().collect();
    let mut stats = HashStats {
        input_files: all_files.len(),
        ..Default::default()
    };

    if all_files.is_empty() {
        log::debug!("Digest pass: No files to process");
        return (DigestGroups::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_HASHING, all_files.len());
    }

    log::info!(
        "Digest pass: Hashing {} files with {} threads",
        all_files.len(),
        config.io_threads
    );

    let completed = AtomicUsize::new(0);
    let hash_results: Vec<(FileEntry, Result<Hash, HashError>)> =
        run_in_pool(config.io_threads, || {
            all_files
                .into_par_iter()
                .map(|file| {
                    if config.is_shutdown_requested() {
                        let path = file.path.clone();
                        return (file, Err(HashError::Interrupted(path)));
                    }

                    if file.size > LARGE_FILE_THRESHOLD {
                        log::debug!(
                            "Hashing large file ({} MB): {}",
                            file.size / (1024 * 1024),
                            file.path.display()
                        );
                    }

                    let result = hasher.full_hash(&file.path);
                    match &result {
                        Ok(_) => log::trace!("Hashed: {}", file.path.display()),
                        Err(e) if e.is_interrupted() => {}
                        Err(e) => log::warn!("Failed to hash {}: {}", file.path.display(), e),
                    }

                    if let Some(ref callback) = config.progress_callback {
                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        callback.on_progress(done, file.path.to_string_lossy().as_ref());
                        if result.is_ok() {
                            callback.on_item_completed(file.size);
                        }
                    }

                    (file, result)
                })
                .collect()
        });

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_HASHING);
    }

    let interrupted = config.is_shutdown_requested()
        || hash_results
            .iter()
            .any(|(_, r)| r.as_ref().is_err_and(HashError::is_interrupted));
    if interrupted {
        stats.interrupted = true;
        log::info!("Digest pass: Interrupted by shutdown signal");
        return (DigestGroups::new(), stats);
    }

    let mut digest_groups = DigestGroups::new();
    for (file, result) in hash_results {
        match result {
            Ok(hash) => {
                stats.hashed_files += 1;
                stats.bytes_hashed += file.size;
                digest_groups.entry(hash).or_default().push(file);
            }
            Err(e) => {
                stats.failed_files += 1;
                stats.errors.push(e);
            }
        }
    }

    digest_groups.retain(|hash, files| {
        if files.len() < 2 {
            stats.eliminated_unique += files.len();
            false
        } else {
            log::debug!(
                "Digest group {}: {} files",
                hash_to_hex(hash),
                files.len()
            );
            true
        }
    });
    stats.digest_groups = digest_groups.len();

    log::info!(
        "Digest pass complete: {} files → {} groups ({} failed, {:.1}% eliminated)",
        stats.input_files,
        stats.digest_groups,
        stats.failed_files,
        stats.elimination_rate()
    );

    (digest_groups, stats)
}

// ============================================================================
// Byte-for-byte verification
// ============================================================================

/// Statistics from byte-for-byte verification of digest groups.
#[derive(Debug, Default)]
pub struct VerifyStats {
    /// Number of digest groups compared
    pub groups_checked: usize,
    /// Number of digest groups whose members were not all identical
    pub groups_split: usize,
    /// Files dropped because no other member matched them exactly
    pub files_dropped: usize,
    /// Errors encountered while reading files for comparison
    pub errors: Vec<HashError>,
    /// Whether verification was interrupted by shutdown
    pub interrupted: bool,
}

/// Split one digest group into classes of byte-identical files.
///
/// A file that cannot be read is recorded in `errors` and left out of every
/// class, whether it fails as the newcomer or as a class representative.
fn partition_identical(
    files: Vec<FileEntry>,
    buffer_size: usize,
    errors: &mut Vec<HashError>,
) -> Vec<Vec<FileEntry>> {
    let mut classes: Vec<Vec<FileEntry>> = Vec::new();

    'files: for file in files {
        let mut i = 0;
        while i < classes.len() {
            match files_identical(&classes[i][0].path, &file.path, buffer_size) {
                Ok(true) => {
                    classes[i].push(file);
                    continue 'files;
                }
                Ok(false) => i += 1,
                Err(e) if e.path() == file.path => {
                    log::warn!("Failed to compare {}: {}", file.path.display(), e);
                    errors.push(e);
                    continue 'files;
                }
                Err(e) => {
                    // Evict the representative; the next member takes its place
                    log::warn!("Failed to compare {}: {}", e.path().display(), e);
                    errors.push(e);
                    classes[i].remove(0);
                    if classes[i].is_empty() {
                        classes.remove(i);
                    }
                }
            }
        }
        classes.push(vec![file]);
    }

    classes
}

/// Confirm digest groups by comparing member content byte for byte.
///
/// Each group is partitioned into classes of exactly identical files. Every
/// class with 2+ members becomes a [`DuplicateGroup`] carrying the group's
/// digest, so a split group yields several results with the same hash.
/// Members that match nobody are dropped with a warning. Output order follows
/// the input order.
#[must_use]
pub fn verify_digest_groups(
    digest_groups: DigestGroups,
    buffer_size: usize,
    config: &HashConfig,
) -> (Vec<DuplicateGroup>, VerifyStats) {
    let mut stats = VerifyStats {
        groups_checked: digest_groups.len(),
        ..Default::default()
    };

    if digest_groups.is_empty() {
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_VERIFYING, digest_groups.len());
    }

    log::info!(
        "Verification: Comparing {} groups byte for byte",
        digest_groups.len()
    );

    let completed = AtomicUsize::new(0);
    let checked: Vec<Option<(Hash, Vec<Vec<FileEntry>>, Vec<HashError>)>> =
        run_in_pool(config.io_threads, || {
            digest_groups
                .into_iter()
                .collect::<Vec<_>>()
                .into_par_iter()
                .map(|(hash, files)| {
                    if config.is_shutdown_requested() {
                        return None;
                    }

                    let label = files[0].path.to_string_lossy().into_owned();
                    let mut errors = Vec::new();
                    let classes = partition_identical(files, buffer_size, &mut errors);

                    if let Some(ref callback) = config.progress_callback {
                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        callback.on_progress(done, &label);
                    }

                    Some((hash, classes, errors))
                })
                .collect()
        });

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_VERIFYING);
    }

    if config.is_shutdown_requested() || checked.iter().any(Option::is_none) {
        stats.interrupted = true;
        return (Vec::new(), stats);
    }

    let mut groups = Vec::new();
    for (hash, classes, errors) in checked.into_iter().flatten() {
        stats.errors.extend(errors);
        if classes.len() > 1 {
            stats.groups_split += 1;
            log::warn!(
                "Hash collision: files with hash {} differ in content",
                hash_to_hex(&hash)
            );
        }

        for class in classes {
            if class.len() < 2 {
                stats.files_dropped += class.len();
                for file in &class {
                    log::warn!(
                        "Dropping {}: content differs from files sharing its hash",
                        file.path.display()
                    );
                }
                continue;
            }
            let size = class[0].size;
            groups.push(DuplicateGroup::new(hash, size, class));
        }
    }

    log::info!(
        "Verification complete: {} groups confirmed, {} split",
        groups.len(),
        stats.groups_split
    );

    (groups, stats)
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
///
/// Controls the behavior of the two-pass duplicate detection pipeline.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Read chunk size used for hashing and verification.
    pub buffer_size: usize,
    /// Enable byte-by-byte verification after hash matching (paranoid mode).
    pub paranoid: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("buffer_size", &self.buffer_size)
            .field("paranoid", &self.paranoid)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            paranoid: false,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Create a new configuration with custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the read chunk size (at least 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Enable paranoid mode (byte-by-byte verification).
    #[must_use]
    pub fn with_paranoid(mut self, enabled: bool) -> Self {
        self.paranoid = enabled;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
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

    fn hash_config(&self) -> HashConfig {
        HashConfig {
            io_threads: self.io_threads,
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Result of the size pass over a directory tree.
#[derive(Debug, Default)]
pub struct SizeScan {
    /// Candidate groups (2+ files sharing a size), in walk order
    pub groups: SizeGroups,
    /// Statistics about the grouping
    pub stats: GroupingStats,
    /// Entries that could not be inspected during the walk
    pub errors: Vec<ScanError>,
}

/// Summary statistics from a duplicate scan.
///
/// Provides metrics about the scan results including file counts, sizes,
/// and potential space savings.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of regular files found
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of size groups with 2+ files
    pub size_groups: usize,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files that could not be hashed
    pub failed_hashes: usize,
    /// Number of hashed files eliminated because their digest was unique
    pub eliminated_by_hash: usize,
    /// Number of files dropped by byte-for-byte verification
    pub eliminated_by_verify: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Non-fatal errors encountered during the scan
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize(self.total_size).to_string()
    }

    /// Whether any two files shared a size.
    #[must_use]
    pub fn has_size_candidates(&self) -> bool {
        self.size_groups > 0
    }

    fn record_groups(&mut self, groups: &[DuplicateGroup]) {
        self.duplicate_groups = groups.len();
        self.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        self.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
    }
}

/// Errors that end a scan without a result.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root directory cannot be read.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while opening the root.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl FinderError {
    fn from_root_io(root: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::PathNotFound(root.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(root.to_path_buf()),
            _ => Self::Io {
                path: root.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Duplicate finder that orchestrates the detection pipeline.
///
/// The `DuplicateFinder` runs:
/// 1. **Walk + size pass** - Collect all regular files and group them by size
/// 2. **Digest pass** - Hash same-size files and group them by content digest
/// 3. **Verification** - Optional byte-for-byte confirmation (paranoid mode)
///
/// # Example
///
/// ```no_run
/// use dupfind::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let config = FinderConfig::default().with_io_threads(4);
/// let finder = DuplicateFinder::new(config);
///
/// let (groups, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
///
/// println!("Found {} duplicate groups", groups.len());
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl std::fmt::Debug for DuplicateFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new().with_buffer_size(config.buffer_size);
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Check that `root` is an existing, readable directory.
    fn validate_root(root: &Path) -> Result<(), FinderError> {
        let metadata = std::fs::metadata(root).map_err(|e| FinderError::from_root_io(root, e))?;
        if !metadata.is_dir() {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }
        std::fs::read_dir(root).map_err(|e| FinderError::from_root_io(root, e))?;
        Ok(())
    }

    /// Walk `root` and group every regular file by size.
    ///
    /// Per-entry failures are collected in [`SizeScan::errors`] and do not
    /// stop the walk.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist, is not a directory, or cannot be read
    /// - The scan is interrupted by shutdown signal
    pub fn group_by_size(&self, root: &Path) -> Result<SizeScan, FinderError> {
        Self::validate_root(root)?;

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
            callback.on_message(&format!("Walking {}", root.display()));
        }

        let mut walker = Walker::new(root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        let mut files = Vec::new();
        let mut errors = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => files.push(file),
                Err(e) => errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!(
            "Found {} files ({} total, {} errors)",
            files.len(),
            ByteSize(files.iter().map(|f| f.size).sum::<u64>()),
            errors.len()
        );

        let (groups, stats) = group_by_size(files);
        Ok(SizeScan {
            groups,
            stats,
            errors,
        })
    }

    /// Regroup size groups by content digest using this finder's hasher.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown was requested.
    pub fn group_by_digest(
        &self,
        size_groups: SizeGroups,
    ) -> Result<(DigestGroups, HashStats), FinderError> {
        let (groups, stats) =
            group_by_digest(size_groups, self.hasher.clone(), self.config.hash_config());
        if stats.interrupted {
            return Err(FinderError::Interrupted);
        }
        Ok((groups, stats))
    }

    /// Find all duplicate files starting from the given path.
    ///
    /// Runs the complete pipeline and returns confirmed duplicate groups
    /// along with summary statistics. An `Ok` with no groups means the scan
    /// completed and found nothing.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist, is not a directory, or cannot be read
    /// - The scan is interrupted by shutdown signal
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupfind::duplicates::DuplicateFinder;
    /// use std::path::Path;
    ///
    /// let finder = DuplicateFinder::with_defaults();
    /// match finder.find_duplicates(Path::new(".")) {
    ///     Ok((groups, summary)) => {
    ///         println!("Found {} duplicate groups", groups.len());
    ///         println!("Can reclaim {} bytes", summary.reclaimable_space);
    ///     }
    ///     Err(e) => eprintln!("Scan failed: {}", e),
    /// }
    /// ```
    pub fn find_duplicates(
        &self,
        root: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        log::info!("Starting duplicate scan of {}", root.display());

        let size_scan = self.group_by_size(root)?;
        let mut summary = ScanSummary {
            total_files: size_scan.stats.total_files,
            total_size: size_scan.stats.total_size,
            size_groups: size_scan.groups.len(),
            eliminated_by_size: size_scan.stats.eliminated_unique,
            scan_errors: size_scan.errors,
            ..Default::default()
        };

        if size_scan.groups.is_empty() {
            log::info!("No potential duplicates found after size grouping");
            summary.scan_duration = start_time.elapsed();
            return Ok((Vec::new(), summary));
        }

        let (digest_groups, hash_stats) = self.group_by_digest(size_scan.groups)?;
        summary.hashed_files = hash_stats.hashed_files;
        summary.failed_hashes = hash_stats.failed_files;
        summary.eliminated_by_hash = hash_stats.eliminated_unique;
        summary
            .scan_errors
            .extend(hash_stats.errors.into_iter().map(ScanError::from));

        let groups = if self.config.paranoid {
            let (groups, verify_stats) = verify_digest_groups(
                digest_groups,
                self.config.buffer_size,
                &self.config.hash_config(),
            );
            if verify_stats.interrupted {
                return Err(FinderError::Interrupted);
            }
            summary.eliminated_by_verify = verify_stats.files_dropped;
            summary
                .scan_errors
                .extend(verify_stats.errors.into_iter().map(ScanError::from));
            groups
        } else {
            digest_groups
                .into_iter()
                .map(|(hash, files)| {
                    let size = files.first().map_or(0, |f| f.size);
                    DuplicateGroup::new(hash, size, files)
                })
                .collect()
        };

        summary.record_groups(&groups);
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable, {} errors",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.scan_errors.len()
        );

        Ok((groups, summary))
    }
}
