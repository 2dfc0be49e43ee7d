//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (first pass)
//! - Content digest grouping (second pass)
//! - Optional byte-for-byte verification of digest matches
//! - Duplicate group management

pub mod finder;
pub mod groups;

pub use finder::{
    group_by_digest, verify_digest_groups, DuplicateFinder, FinderConfig, FinderError,
    HashConfig, HashStats, ScanSummary, SizeScan, VerifyStats, DEFAULT_IO_THREADS,
};
pub use groups::{group_by_size, DigestGroups, DuplicateGroup, GroupingStats, SizeGroups};
