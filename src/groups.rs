//! Grouping of duplicate copies by series and volume.
//!
//! # Overview
//!
//! Every file whose descriptor names a series is filed under a
//! [`ComicKey`] (series, volume). Several files under one key are copies of
//! the same issue; the publisher later keeps only the largest.
//!
//! # Example
//!
//! ```
//! use comiclink::groups::{Candidate, ComicGroups, ComicKey, Volume};
//! use std::path::PathBuf;
//!
//! let key = ComicKey::new("Alpha", Volume::from_digits("1"));
//! let mut groups = ComicGroups::new();
//! groups.insert(key.clone(), Candidate::new(PathBuf::from("/a.cbz"), "First", 2));
//! groups.insert(key.clone(), Candidate::new(PathBuf::from("/b.cbz"), "First", 5));
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups.duplicate_count(), 1);
//! let best = groups.get(&key).and_then(|c| comiclink::groups::best_candidate(c)).unwrap();
//! assert_eq!(best.path, PathBuf::from("/b.cbz"));
//! ```

use std::cmp::Reverse;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::path::PathBuf;

/// Marker used when a file name carries no volume number.
pub const NO_VOLUME: &str = "NoVolume";

/// Volume part of a [`ComicKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Volume {
    /// Volume number, zero-padded to at least two digits
    Numbered(String),
    /// No volume marker in the file name
    Unknown,
}

impl Volume {
    /// Build a numbered volume from the digits found in a file name.
    ///
    /// ```
    /// use comiclink::groups::Volume;
    ///
    /// assert_eq!(Volume::from_digits("3").to_string(), "03");
    /// assert_eq!(Volume::from_digits("12").to_string(), "12");
    /// assert_eq!(Volume::from_digits("104").to_string(), "104");
    /// ```
    #[must_use]
    pub fn from_digits(digits: &str) -> Self {
        Self::Numbered(format!("{digits:0>2}"))
    }

    /// Whether a number was found.
    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Numbered(_))
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numbered(n) => f.write_str(n),
            Self::Unknown => f.write_str(NO_VOLUME),
        }
    }
}

/// Identity of one comic issue across duplicate files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComicKey {
    /// Series as written in the descriptor (not sanitized)
    pub series: String,
    /// Volume parsed from the file name
    pub volume: Volume,
}

impl ComicKey {
    /// Create a new key.
    #[must_use]
    pub fn new(series: impl Into<String>, volume: Volume) -> Self {
        Self {
            series: series.into(),
            volume,
        }
    }
}

impl fmt::Display for ComicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.series, self.volume)
    }
}

/// One file competing to represent a [`ComicKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute path of the archive
    pub path: PathBuf,
    /// Title from the descriptor
    pub title: String,
    /// File size in bytes, captured during the walk
    pub size: u64,
}

impl Candidate {
    /// Create a new candidate.
    #[must_use]
    pub fn new(path: PathBuf, title: impl Into<String>, size: u64) -> Self {
        Self {
            path,
            title: title.into(),
            size,
        }
    }
}

/// Pick the copy to publish: the largest file, earliest seen on ties.
#[must_use]
pub fn best_candidate(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().min_by_key(|c| Reverse(c.size))
}

/// Multi-map from [`ComicKey`] to the candidates discovered for it.
///
/// Keys only exist once a candidate has been inserted, so every list holds
/// at least one entry. Iteration is ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComicGroups {
    groups: BTreeMap<ComicKey, Vec<Candidate>>,
}

impl ComicGroups {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate under `key`.
    pub fn insert(&mut self, key: ComicKey, candidate: Candidate) {
        self.groups.entry(key).or_default().push(candidate);
    }

    /// Append every candidate of `other`, after the ones already present.
    pub fn merge(&mut self, other: ComicGroups) {
        for (key, mut candidates) in other.groups {
            self.groups.entry(key).or_default().append(&mut candidates);
        }
    }

    /// Candidates recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &ComicKey) -> Option<&[Candidate]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no key has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total candidates across all keys.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Candidates that will not be published (all copies minus one per key).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.candidate_count() - self.len()
    }

    /// Iterate over keys and their candidates.
    pub fn iter(&self) -> btree_map::Iter<'_, ComicKey, Vec<Candidate>> {
        self.groups.iter()
    }
}

impl<'a> IntoIterator for &'a ComicGroups {
    type Item = (&'a ComicKey, &'a Vec<Candidate>);
    type IntoIter = btree_map::Iter<'a, ComicKey, Vec<Candidate>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
