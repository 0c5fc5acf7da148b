//! Per-file classification.
//!
//! Each discovered file ends up in exactly one [`Classification`]:
//!
//! - [`Classification::Grouped`]: the descriptor named a series or title;
//!   the file joins the group for its (series, volume) key.
//! - [`Classification::Fallback`]: no usable descriptor; the file will be
//!   published under its parent directory name.
//! - [`Classification::MissingInfo`]: a descriptor exists but has neither
//!   series nor title. Dropped unless `missing_info_fallback` is enabled.
//!
//! The classifier performs no filesystem writes; acting on the outcome is
//! left to [`crate::pipeline`].

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::groups::{Candidate, ComicKey, Volume};
use crate::metadata::{extract_comic_info, ComicInfo};
use crate::scanner::ComicFile;
use crate::stats::RunStats;

/// Volume marker: a `.T` or `_T` followed by digits, e.g. `Gaston.T12.cbz`.
pub const DEFAULT_VOLUME_PATTERN: &str = r"[._]T(\d+)";

/// Extracts the volume number from a file name.
#[derive(Debug, Clone)]
pub struct VolumeMatcher {
    pattern: Regex,
}

impl VolumeMatcher {
    /// Compile a volume pattern. The first capture group must hold the digits.
    ///
    /// # Errors
    ///
    /// Returns the regex error for an invalid pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Volume encoded in the file name of `path`.
    ///
    /// Only the final path component is searched, so a directory such as
    /// `/comics/Vol.T2 archive/` cannot leak a number into its files.
    #[must_use]
    pub fn volume_for(&self, path: &Path) -> Volume {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        self.pattern
            .captures(&name)
            .and_then(|caps| caps.get(1))
            .map_or(Volume::Unknown, |m| Volume::from_digits(m.as_str()))
    }
}

impl Default for VolumeMatcher {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_VOLUME_PATTERN).expect("default pattern is valid"),
        }
    }
}

/// Outcome of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Grouped by descriptor metadata.
    Grouped {
        /// Group key
        key: ComicKey,
        /// This file as a group member
        candidate: Candidate,
    },
    /// To be published under its parent directory name.
    Fallback {
        /// The file to link
        file: PathBuf,
    },
    /// Descriptor present but empty; not published.
    MissingInfo,
}

/// Classifies files by their descriptor.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    volumes: VolumeMatcher,
    missing_info_fallback: bool,
}

impl Classifier {
    /// Create a classifier with the given volume matcher.
    #[must_use]
    pub fn new(volumes: VolumeMatcher) -> Self {
        Self {
            volumes,
            missing_info_fallback: false,
        }
    }

    /// Route descriptors without series and title to the directory layout.
    #[must_use]
    pub fn with_missing_info_fallback(mut self, enabled: bool) -> Self {
        self.missing_info_fallback = enabled;
        self
    }

    /// Read the descriptor of `file` and classify it.
    ///
    /// Returned statistics cover only the descriptor counters and `errors`.
    #[must_use]
    pub fn classify(&self, file: &ComicFile) -> (Classification, RunStats) {
        let mut stats = RunStats::default();

        let info = match extract_comic_info(&file.path) {
            Ok(Some(info)) => info,
            Ok(None) => {
                log::warn!("ComicInfo.xml not found in {}", file.path.display());
                stats.files_without_comicinfo += 1;
                return (Classification::Fallback { file: file.path.clone() }, stats);
            }
            Err(e) => {
                if expects_zip(&file.path) {
                    log::error!("Error processing {}: {}", file.path.display(), e);
                    stats.errors += 1;
                } else {
                    log::debug!("No readable descriptor in {}: {}", file.path.display(), e);
                }
                stats.files_without_comicinfo += 1;
                return (Classification::Fallback { file: file.path.clone() }, stats);
            }
        };

        stats.files_with_comicinfo += 1;
        (self.classify_info(file, info, &mut stats), stats)
    }

    /// Classify a file whose descriptor has already been read.
    pub fn classify_info(
        &self,
        file: &ComicFile,
        info: ComicInfo,
        stats: &mut RunStats,
    ) -> Classification {
        if info.is_missing_info() {
            stats.files_with_missing_info += 1;
            return if self.missing_info_fallback {
                log::info!(
                    "No series or title in {}, using directory layout",
                    file.path.display()
                );
                Classification::Fallback {
                    file: file.path.clone(),
                }
            } else {
                log::warn!(
                    "No series or title in {}, file will not be linked",
                    file.path.display()
                );
                Classification::MissingInfo
            };
        }

        let key = ComicKey::new(info.series, self.volumes.volume_for(&file.path));
        let candidate = Candidate::new(file.path.clone(), info.title, file.size);
        Classification::Grouped { key, candidate }
    }
}

/// `.cbz` files are zip archives by definition; other formats may not be.
fn expects_zip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("cbz"))
}
