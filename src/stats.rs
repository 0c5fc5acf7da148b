//! Run statistics and the text report built from them.
//!
//! Workers never share a counter: each one folds into its own [`RunStats`]
//! and the partial values are added together once the parallel phase ends.

use std::fmt;
use std::ops::{Add, AddAssign};

/// Counters describing one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Files matching the configured extensions
    pub total_files: usize,
    /// Files whose archive carried a descriptor
    pub files_with_comicinfo: usize,
    /// Files without a readable descriptor
    pub files_without_comicinfo: usize,
    /// Files whose descriptor had neither series nor title
    pub files_with_missing_info: usize,
    /// Groups published from descriptor metadata
    pub symlinks_created_comicinfo: usize,
    /// Files published through the directory fallback
    pub symlinks_created_filename: usize,
    /// Stale links deleted by the reaper
    pub symlinks_removed: usize,
    /// Candidates not published because a larger copy won
    pub duplicates: usize,
    /// Publish attempts that found the destination already occupied
    pub links_already_present: usize,
    /// Per-file failures (unreadable archive, failed symlink, vanished source)
    pub errors: usize,
}

impl RunStats {
    /// Whether any per-file failure was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Render the fixed multi-line report.
    #[must_use]
    pub fn report(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total files processed: {}", self.total_files)?;
        writeln!(f, "Files with ComicInfo.xml: {}", self.files_with_comicinfo)?;
        writeln!(
            f,
            "Files without ComicInfo.xml: {}",
            self.files_without_comicinfo
        )?;
        writeln!(f, "Files with missing info: {}", self.files_with_missing_info)?;
        writeln!(
            f,
            "Symlinks created based on existing comicinfo: {}",
            self.symlinks_created_comicinfo
        )?;
        writeln!(
            f,
            "Symlinks created based on filenames (missing comicinfo): {}",
            self.symlinks_created_filename
        )?;
        writeln!(f, "Duplicates detected (not reflinked): {}", self.duplicates)?;
        writeln!(f, "Symlinks removed: {}", self.symlinks_removed)?;
        writeln!(f, "Symlinks already present: {}", self.links_already_present)?;
        writeln!(f, "Errors: {}", self.errors)
    }
}

impl AddAssign for RunStats {
    fn add_assign(&mut self, rhs: Self) {
        self.total_files += rhs.total_files;
        self.files_with_comicinfo += rhs.files_with_comicinfo;
        self.files_without_comicinfo += rhs.files_without_comicinfo;
        self.files_with_missing_info += rhs.files_with_missing_info;
        self.symlinks_created_comicinfo += rhs.symlinks_created_comicinfo;
        self.symlinks_created_filename += rhs.symlinks_created_filename;
        self.symlinks_removed += rhs.symlinks_removed;
        self.duplicates += rhs.duplicates;
        self.links_already_present += rhs.links_already_present;
        self.errors += rhs.errors;
    }
}

impl Add for RunStats {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}
