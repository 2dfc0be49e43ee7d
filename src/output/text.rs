//! Plain-text console report.
//!
//! Prints each duplicate group as a header line carrying the content hash
//! followed by the group's paths, indented by two spaces:
//!
//! ```text
//!
//! Duplicate files with hash 3a6eb0790f39ac87c94f3856b2dd2c5d110e6811602261a9a923d3bb23adc8b7:
//!   /data/a.txt
//!   /data/b.txt
//! ```
//!
//! When nothing was found, a single line says which pass ruled everything
//! out.

use std::io::Write;

use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Message printed when no two files share a size.
pub const NO_SIZE_DUPLICATES: &str = "No duplicate files found based on size.";
/// Message printed when same-size files all differ in content.
pub const NO_CONTENT_DUPLICATES: &str = "No duplicate files found based on content.";

/// Text renderer for a finished scan.
#[derive(Debug)]
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
}

impl<'a> TextOutput<'a> {
    /// Create a text report over the given results.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &'a ScanSummary) -> Self {
        Self { groups, summary }
    }

    /// Write the duplicate report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        if self.groups.is_empty() {
            let message = if self.summary.has_size_candidates() {
                NO_CONTENT_DUPLICATES
            } else {
                NO_SIZE_DUPLICATES
            };
            return writeln!(writer, "{message}");
        }

        for group in self.groups {
            writeln!(writer)?;
            writeln!(writer, "Duplicate files with hash {}:", group.hash_hex())?;
            for file in &group.files {
                writeln!(writer, "  {}", file.path.display())?;
            }
        }
        Ok(())
    }

    /// Write a one-line tally of the scan.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_summary<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let summary = self.summary;
        write!(
            writer,
            "Scanned {} files ({}) in {:.2}s: {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.total_files,
            summary.total_size_display(),
            summary.scan_duration.as_secs_f64(),
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        )?;
        if !summary.scan_errors.is_empty() {
            write!(writer, " ({} entries skipped)", summary.scan_errors.len())?;
        }
        writeln!(writer)
    }

    /// Render the report to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{FileEntry, ScanError};
    use std::path::PathBuf;

    fn group(hash: u8, paths: &[&str]) -> DuplicateGroup {
        DuplicateGroup::new(
            [hash; 32],
            5,
            paths
                .iter()
                .map(|p| FileEntry::new(PathBuf::from(p), 5))
                .collect(),
        )
    }

    #[test]
    fn test_no_size_candidates_message() {
        let summary = ScanSummary::default();
        let output = TextOutput::new(&[], &summary);

        assert_eq!(output.render(), format!("{NO_SIZE_DUPLICATES}\n"));
    }

    #[test]
    fn test_no_content_duplicates_message() {
        let summary = ScanSummary {
            size_groups: 1,
            ..Default::default()
        };
        let output = TextOutput::new(&[], &summary);

        assert_eq!(output.render(), format!("{NO_CONTENT_DUPLICATES}\n"));
    }

    #[test]
    fn test_groups_rendered_in_order() {
        let groups = vec![group(0xaa, &["/a", "/b"]), group(0x01, &["/c", "/d", "/e"])];
        let summary = ScanSummary::default();
        let rendered = TextOutput::new(&groups, &summary).render();

        let expected = format!(
            "\nDuplicate files with hash {}:\n  /a\n  /b\n\nDuplicate files with hash {}:\n  /c\n  /d\n  /e\n",
            "aa".repeat(32),
            "01".repeat(32)
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_summary_line() {
        let summary = ScanSummary {
            total_files: 3,
            duplicate_groups: 1,
            duplicate_files: 1,
            scan_errors: vec![ScanError::NotFound(PathBuf::from("/gone"))],
            ..Default::default()
        };
        let mut buffer = Vec::new();
        TextOutput::new(&[], &summary)
            .write_summary(&mut buffer)
            .unwrap();
        let line = String::from_utf8(buffer).unwrap();

        assert!(line.starts_with("Scanned 3 files"));
        assert!(line.contains("1 duplicate groups"));
        assert!(line.trim_end().ends_with("(1 entries skipped)"));
    }
}
