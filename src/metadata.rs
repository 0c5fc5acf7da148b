//! ComicInfo.xml extraction from comic archives.
//!
//! # Overview
//!
//! A `.cbz` is a zip archive of page images. Many taggers add a
//! `ComicInfo.xml` descriptor at the archive root; its `Series` and `Title`
//! elements drive the metadata grouping in [`crate::classify`].
//!
//! Extraction has three outcomes:
//! - `Ok(Some(info))` the descriptor was found and parsed
//! - `Ok(None)` the archive opened but carries no descriptor
//! - `Err(_)` the file is not a readable zip or the XML is malformed
//!
//! Callers treat an error exactly like a missing descriptor after logging it;
//! a single bad file never stops a run.
//!
//! # Example
//!
//! ```no_run
//! use comiclink::metadata::extract_comic_info;
//! use std::path::Path;
//!
//! match extract_comic_info(Path::new("Asterix.T01.cbz")) {
//!     Ok(Some(info)) => println!("{} / {}", info.series, info.title),
//!     Ok(None) => println!("no descriptor"),
//!     Err(e) => eprintln!("unreadable: {e}"),
//! }
//! ```

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use regex::bytes::Regex;
use thiserror::Error;

/// Name of the descriptor entry inside an archive.
pub const DESCRIPTOR_NAME: &str = "ComicInfo.xml";

/// Placeholder for a `Series` or `Title` that is absent or empty.
pub const NOT_AVAILABLE: &str = "N/A";

/// `encoding` pseudo-attribute of a leading XML declaration.
static DECLARED_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*<\?xml\s[^>]*?\bencoding\s*=\s*["']([A-Za-z][A-Za-z0-9._:\-]*)["']"#)
        .expect("static pattern is valid")
});

/// Errors that can occur while reading a descriptor.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The file could not be opened or read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Archive path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The file is not a valid zip archive.
    #[error("corrupt or unsupported archive {path}: {source}")]
    Archive {
        /// Archive path
        path: PathBuf,
        /// The underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// The descriptor is not well-formed XML.
    #[error("malformed {DESCRIPTOR_NAME} in {path}: {source}")]
    Xml {
        /// Archive path
        path: PathBuf,
        /// The underlying parser error
        #[source]
        source: roxmltree::Error,
    },
}

/// Series and title read from a descriptor.
///
/// Each field independently falls back to [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicInfo {
    /// Content of the first top-level `Series` element
    pub series: String,
    /// Content of the first top-level `Title` element
    pub title: String,
}

impl ComicInfo {
    /// Create a descriptor record.
    #[must_use]
    pub fn new(series: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            title: title.into(),
        }
    }

    /// Whether neither series nor title were usable.
    #[must_use]
    pub fn is_missing_info(&self) -> bool {
        self.series == NOT_AVAILABLE && self.title == NOT_AVAILABLE
    }
}

/// Open `path` as a zip archive and read its descriptor, if any.
///
/// # Errors
///
/// Returns [`MetadataError`] when the archive cannot be opened or read, or
/// when the descriptor exists but cannot be parsed.
pub fn extract_comic_info(path: &Path) -> Result<Option<ComicInfo>, MetadataError> {
    let file = File::open(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut archive = zip::ZipArchive::new(file).map_err(|source| MetadataError::Archive {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entry = match archive.by_name(DESCRIPTOR_NAME) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(source) => {
            return Err(MetadataError::Archive {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut raw = Vec::new();
    entry
        .read_to_end(&mut raw)
        .map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let text = decode_descriptor(&raw);
    let info = parse_comic_info(&text).map_err(|source| MetadataError::Xml {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!(
        "Extracted from {} - Series: {}, Title: {}",
        path.display(),
        info.series,
        info.title
    );

    Ok(Some(info))
}

/// Decode raw descriptor bytes to text.
///
/// A byte order mark wins over the XML declaration; without either the
/// document is read as UTF-8. Undecodable bytes become U+FFFD.
#[must_use]
pub fn decode_descriptor(raw: &[u8]) -> Cow<'_, str> {
    let (encoding, body) = match Encoding::for_bom(raw) {
        Some((encoding, bom_len)) => (encoding, &raw[bom_len..]),
        None => (declared_encoding(raw).unwrap_or(UTF_8), raw),
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        log::debug!("Descriptor is not valid {}, some characters were replaced", encoding.name());
    }
    text
}

/// Encoding named by the XML declaration, if it is one we know.
fn declared_encoding(raw: &[u8]) -> Option<&'static Encoding> {
    let label = DECLARED_ENCODING.captures(raw)?.get(1)?.as_bytes();
    let encoding = Encoding::for_label(label);
    // A declaration readable as ASCII cannot be UTF-16 without a BOM
    if encoding.is_some_and(|e| e == UTF_16LE || e == UTF_16BE) {
        return Some(UTF_8);
    }
    if encoding.is_none() {
        log::debug!(
            "Unknown descriptor encoding '{}', reading as UTF-8",
            String::from_utf8_lossy(label)
        );
    }
    encoding
}

/// Parse descriptor XML into a [`ComicInfo`].
///
/// Only direct children of the root element are considered, and only the
/// first occurrence of each. A document type declaration is accepted.
///
/// # Errors
///
/// Returns the parser error for malformed XML.
pub fn parse_comic_info(xml: &str) -> Result<ComicInfo, roxmltree::Error> {
    let xml = xml.trim_start_matches('\u{feff}');
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(xml, options)?;
    let root = doc.root_element();

    let field = |name: &str| -> String {
        root.children()
            .find(|n| n.is_element() && n.tag_name().name() == name)
            .and_then(|n| n.text())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    };

    Ok(ComicInfo {
        series: field("Series"),
        title: field("Title"),
    })
}
