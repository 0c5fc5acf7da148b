//! Removal of stale links from the destination tree.
//!
//! After publishing, every symlink under the destination root is inspected.
//! A link whose target no longer exists (the source comic was deleted,
//! renamed, or replaced by a better copy elsewhere) is removed. Links with
//! live targets, regular files and directories are never touched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Errors from the reaper.
#[derive(Debug, Error)]
pub enum ReapError {
    /// A stale link could not be deleted.
    #[error("failed to remove {path}: {source}")]
    Remove {
        /// Link that could not be removed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A directory could not be read.
    #[error("failed to walk {path}: {message}")]
    Walk {
        /// Entry that failed
        path: PathBuf,
        /// Description from the walker
        message: String,
    },
}

/// Summary of one reaper pass.
#[derive(Debug, Default)]
pub struct ReapReport {
    /// Links that were deleted
    pub removed: Vec<PathBuf>,
    /// Entries that could not be inspected or removed
    pub errors: Vec<ReapError>,
}

/// Resolve the immediate target of `link`.
///
/// Relative targets are interpreted against the directory holding the link,
/// which is how the operating system resolves them.
///
/// # Errors
///
/// Returns the error from reading the link.
pub fn link_target(link: &Path) -> io::Result<PathBuf> {
    let target = fs::read_link(link)?;
    if target.is_absolute() {
        return Ok(target);
    }
    Ok(link
        .parent()
        .map_or_else(|| target.clone(), |dir| dir.join(&target)))
}

/// Whether `link` is a symlink whose target is gone.
///
/// Only the link itself is read; existence of its target is checked through
/// any further links, so a chain that ends nowhere is stale too.
#[must_use]
pub fn is_stale(link: &Path) -> bool {
    match link_target(link) {
        Ok(target) => !target.exists(),
        Err(_) => false,
    }
}

/// Remove every stale symlink under `root`.
///
/// A missing `root` is treated as an empty tree.
#[must_use]
pub fn reap_stale_links(root: &Path) -> ReapReport {
    let mut report = ReapReport::default();

    if fs::symlink_metadata(root).is_err() {
        log::debug!("Destination {} does not exist, nothing to clean", root.display());
        return report;
    }

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                log::warn!("Cleanup walker error for {}: {}", path.display(), e);
                report.errors.push(ReapError::Walk {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if !entry.path_is_symlink() || !is_stale(entry.path()) {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => {
                log::info!("Removed obsolete symlink: {}", entry.path().display());
                report.removed.push(entry.into_path());
            }
            Err(source) => {
                log::error!(
                    "Failed to remove obsolete symlink {}: {}",
                    entry.path().display(),
                    source
                );
                report.errors.push(ReapError::Remove {
                    path: entry.into_path(),
                    source,
                });
            }
        }
    }

    report
}
