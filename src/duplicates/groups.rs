//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module provides the grouping data structures used by both passes of
//! duplicate detection and the size-grouping pass itself.
//!
//! ## Size Grouping
//!
//! Size grouping is the first pass. Files with different sizes cannot be
//! duplicates, so every file whose size is unique in the tree is dropped here
//! and never opened for hashing.
//!
//! ## Ordering
//!
//! Both [`SizeGroups`] and [`DigestGroups`] are insertion-ordered maps: keys
//! appear in the order they were first seen and members keep the order they
//! were added (walk order). A static tree therefore always yields the same
//! groups in the same order.
//!
//! # Example
//!
//! ```
//! use dupfind::scanner::FileEntry;
//! use dupfind::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! // Group by size - only groups with 2+ files are potential duplicates
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);  // Two 1024-byte files
//! assert_eq!(groups.len(), 1);  // Only one size group with multiple files
//! ```

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use crate::scanner::{FileEntry, Hash};

/// Files grouped by exact size, in first-seen order.
pub type SizeGroups = IndexMap<u64, Vec<FileEntry>>;

/// Files grouped by content digest, in first-seen order.
pub type DigestGroups = IndexMap<Hash, Vec<FileEntry>>;

/// Confirmed duplicate group of files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// BLAKE3 hash of the file content (32 bytes)
    pub hash: Hash,
    /// File size in bytes (shared by all files in the group)
    pub size: u64,
    /// Files with this content, in walk order
    pub files: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(hash: Hash, size: u64, files: Vec<FileEntry>) -> Self {
        Self { hash, size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        crate::scanner::hash_to_hex(&self.hash)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Statistics from the size grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes seen
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of zero-byte files encountered
    pub empty_files: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (first pass of duplicate detection).
///
/// Groups all files by their exact size and drops every group with fewer than
/// two members. Zero-byte files are grouped like any other size, so two empty
/// files form a candidate group.
///
/// # Returns
///
/// A tuple of:
/// - [`SizeGroups`] - Files grouped by size (only groups with 2+ files)
/// - [`GroupingStats`] - Statistics about the grouping operation
///
/// # Example
///
/// ```
/// use dupfind::scanner::FileEntry;
/// use dupfind::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileEntry::new(PathBuf::from("/a.txt"), 100),
///     FileEntry::new(PathBuf::from("/b.txt"), 100),
///     FileEntry::new(PathBuf::from("/c.txt"), 200),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[&100u64].len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);  // The 200-byte file
/// ```
#[must_use]
pub fn group_by_size(files: impl IntoIterator<Item = FileEntry>) -> (SizeGroups, GroupingStats) {
    let mut all_groups = SizeGroups::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        if file.size == 0 {
            stats.empty_files += 1;
        }

        all_groups.entry(file.size).or_default().push(file);
    }

    stats.unique_sizes = all_groups.len();

    // `retain` keeps the relative order of surviving keys
    all_groups.retain(|size, files| {
        if files.len() < 2 {
            stats.eliminated_unique += files.len();
            log::trace!(
                "Eliminated unique size {}: {}",
                size,
                files[0].path.display()
            );
            false
        } else {
            stats.potential_duplicates += files.len();
            stats.duplicate_groups += 1;
            log::debug!(
                "Size group {} bytes: {} potential duplicates",
                size,
                files.len()
            );
            true
        }
    });

    log::info!(
        "Size pass complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (all_groups, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_file(path: &str, size: u64) -> FileEntry {
        FileEntry::new(PathBuf::from(path), size)
    }

    #[test]
    fn test_group_by_size_empty_input() {
        let (groups, stats) = group_by_size(Vec::new());

        assert!(groups.is_empty());
        assert_eq!(stats, GroupingStats::default());
        assert_eq!(stats.elimination_rate(), 0.0);
    }

    #[test]
    fn test_group_by_size_drops_singletons() {
        let files = vec![
            make_file("/a.txt", 100),
            make_file("/b.txt", 200),
            make_file("/c.txt", 300),
        ];

        let (groups, stats) = group_by_size(files);

        assert!(groups.is_empty());
        assert_eq!(stats.eliminated_unique, 3);
        assert_eq!(stats.unique_sizes, 3);
        assert!((stats.elimination_rate() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_group_by_size_keeps_zero_byte_files() {
        let files = vec![make_file("/empty1", 0), make_file("/empty2", 0)];

        let (groups, stats) = group_by_size(files);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&0u64].len(), 2);
        assert_eq!(stats.empty_files, 2);
    }

    #[test]
    fn test_group_by_size_preserves_order() {
        let files = vec![
            make_file("/x1", 50),
            make_file("/y1", 10),
            make_file("/x2", 50),
            make_file("/lonely", 99),
            make_file("/y2", 10),
            make_file("/x3", 50),
        ];

        let (groups, _) = group_by_size(files);

        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec![50, 10]);

        let x: Vec<_> = groups[&50u64].iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            x,
            vec![PathBuf::from("/x1"), PathBuf::from("/x2"), PathBuf::from("/x3")]
        );
    }

    #[test]
    fn test_group_by_size_stats() {
        let files = vec![
            make_file("/a", 10),
            make_file("/b", 10),
            make_file("/c", 20),
            make_file("/d", 30),
            make_file("/e", 30),
            make_file("/f", 30),
        ];

        let (groups, stats) = group_by_size(files);

        assert_eq!(groups.len(), 2);
        assert_eq!(stats.total_files, 6);
        assert_eq!(stats.total_size, 130);
        assert_eq!(stats.potential_duplicates, 5);
        assert_eq!(stats.eliminated_unique, 1);
        assert_eq!(stats.duplicate_groups, 2);
    }

    #[test]
    fn test_duplicate_group_wasted_space() {
        let group = DuplicateGroup::new(
            [0u8; 32],
            1000,
            vec![
                make_file("/a.txt", 1000),
                make_file("/b.txt", 1000),
                make_file("/c.txt", 1000),
            ],
        );

        assert_eq!(group.len(), 3);
        assert_eq!(group.total_size(), 3000);
        assert_eq!(group.wasted_space(), 2000);
        assert_eq!(group.duplicate_count(), 2);
    }

    #[test]
    fn test_duplicate_group_single_file() {
        let group = DuplicateGroup::new([1u8; 32], 500, vec![make_file("/a.txt", 500)]);

        assert_eq!(group.wasted_space(), 0);
        assert_eq!(group.duplicate_count(), 0);
        assert!(!group.is_empty());
    }

    #[test]
    fn test_duplicate_group_hash_hex_and_paths() {
        let group = DuplicateGroup::new(
            [0xab; 32],
            1,
            vec![make_file("/a", 1), make_file("/b", 1)],
        );

        assert_eq!(group.hash_hex(), "ab".repeat(32));
        assert_eq!(group.paths(), vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }
}
