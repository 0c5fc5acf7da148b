//! Symlink publishing into the destination tree.
//!
//! # Overview
//!
//! Two layouts are produced under the destination root:
//!
//! - **Metadata layout**: one link per [`ComicKey`], named
//!   `<series>/<volume>.<title><ext>` (or `<series>/<file name>` when the
//!   volume is unknown), pointing at the largest copy.
//! - **Directory layout**: files without a descriptor are linked as
//!   `<parent directory>/<file name>`.
//!
//! Every path component goes through [`crate::sanitize`]. Existing entries
//! at a destination are never replaced, which makes publishing idempotent.
//!
//! # Example
//!
//! ```no_run
//! use comiclink::publish::{create_symlink, LinkOutcome};
//! use std::path::Path;
//!
//! let outcome = create_symlink(
//!     Path::new("/srv/comics/Alpha.T01.cbz"),
//!     Path::new("/srv/library/Alpha/01.First.cbz"),
//! );
//! assert!(matches!(outcome, LinkOutcome::Created | LinkOutcome::AlreadyExists));
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use thiserror::Error;

use crate::groups::{best_candidate, Candidate, ComicKey};
use crate::sanitize::{clean_file_name, clean_name};
use crate::stats::RunStats;

/// Directory used when a series name sanitizes to nothing.
pub const UNSORTED_DIR: &str = "Unsorted";

/// Errors that abort publishing.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A series directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Result of a single link attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new link was written.
    Created,
    /// Something already occupies the destination; it was left alone.
    AlreadyExists,
    /// The link target vanished before it could be linked.
    SourceMissing,
    /// The operating system refused to create the link.
    Failed,
}

impl LinkOutcome {
    /// Fold this outcome into the statistics.
    pub fn record(self, stats: &mut RunStats) {
        match self {
            Self::Created => {}
            Self::AlreadyExists => stats.links_already_present += 1,
            Self::SourceMissing | Self::Failed => stats.errors += 1,
        }
    }
}

/// Create a symlink at `dest` pointing to `source` unless `dest` exists.
///
/// A dangling link at `dest` counts as existing; the reaper removes those.
#[must_use]
pub fn create_symlink(source: &Path, dest: &Path) -> LinkOutcome {
    if !source.exists() {
        log::warn!("Source file does not exist: {}", source.display());
        return LinkOutcome::SourceMissing;
    }

    if fs::symlink_metadata(dest).is_ok() {
        log::info!("Symlink already exists: {}", dest.display());
        return LinkOutcome::AlreadyExists;
    }

    match symlink_file(source, dest) {
        Ok(()) => {
            log::info!("Symlink created: {}", dest.display());
            LinkOutcome::Created
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            // Another worker won the race for the same destination
            log::info!("Symlink already exists: {}", dest.display());
            LinkOutcome::AlreadyExists
        }
        Err(e) => {
            log::error!("Failed to create symlink for {}: {}", source.display(), e);
            LinkOutcome::Failed
        }
    }
}

#[cfg(unix)]
fn symlink_file(source: &Path, dest: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, dest)
}

#[cfg(windows)]
fn symlink_file(source: &Path, dest: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(source, dest)
}

#[cfg(not(any(unix, windows)))]
fn symlink_file(_source: &Path, _dest: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}

/// Destination directory for a series.
#[must_use]
pub fn series_dir(dest_root: &Path, series: &str) -> PathBuf {
    let cleaned = clean_name(series);
    if cleaned.is_empty() {
        dest_root.join(UNSORTED_DIR)
    } else {
        dest_root.join(cleaned)
    }
}

/// Link path for the winning copy of a metadata group.
#[must_use]
pub fn metadata_link_path(dest_root: &Path, key: &ComicKey, winner: &Candidate) -> PathBuf {
    let dir = series_dir(dest_root, &key.series);

    if key.volume.is_known() {
        let ext = winner
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        dir.join(format!("{}.{}{}", key.volume, clean_name(&winner.title), ext))
    } else {
        dir.join(clean_file_name(&file_name_lossy(&winner.path)))
    }
}

/// Series name used by the directory layout: the file's parent directory.
#[must_use]
pub fn fallback_series(file: &Path) -> String {
    file.parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Link path for a file published through the directory layout.
#[must_use]
pub fn fallback_link_path(dest_root: &Path, file: &Path) -> PathBuf {
    series_dir(dest_root, &fallback_series(file)).join(clean_file_name(&file_name_lossy(file)))
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn ensure_dir(dir: &Path) -> Result<(), PublishError> {
    fs::create_dir_all(dir).map_err(|source| PublishError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Publish a file that has no descriptor, using its parent directory name.
///
/// # Errors
///
/// Returns [`PublishError::CreateDir`] if the series directory cannot be
/// created.
pub fn link_by_directory(dest_root: &Path, file: &Path) -> Result<RunStats, PublishError> {
    log::info!(
        "ComicInfo.xml not found in {}. Creating symlink based on directory and filename.",
        file.display()
    );

    let dest = fallback_link_path(dest_root, file);
    if let Some(dir) = dest.parent() {
        ensure_dir(dir)?;
    }

    let mut stats = RunStats {
        symlinks_created_filename: 1,
        ..RunStats::default()
    };
    create_symlink(file, &dest).record(&mut stats);
    Ok(stats)
}

/// Publish the largest copy of one group.
///
/// # Errors
///
/// Returns [`PublishError::CreateDir`] if the series directory cannot be
/// created.
pub fn publish_group(
    dest_root: &Path,
    key: &ComicKey,
    candidates: &[Candidate],
) -> Result<RunStats, PublishError> {
    let mut stats = RunStats::default();
    let Some(winner) = best_candidate(candidates) else {
        return Ok(stats);
    };

    log::debug!(
        "Selected {} ({}) for {} out of {} copies",
        winner.path.display(),
        ByteSize(winner.size),
        key,
        candidates.len()
    );

    let dest = metadata_link_path(dest_root, key, winner);
    if let Some(dir) = dest.parent() {
        ensure_dir(dir)?;
    }

    create_symlink(&winner.path, &dest).record(&mut stats);
    stats.symlinks_created_comicinfo += 1;
    stats.duplicates += candidates.len() - 1;
    Ok(stats)
}
