//! Fixture builders shared by the integration tests.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use comiclink::pipeline::{Pipeline, PipelineConfig};
use comiclink::stats::RunStats;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Descriptor XML with the given fields; `None` leaves the element out.
pub fn comic_info(series: Option<&str>, title: Option<&str>) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<ComicInfo>\n");
    if let Some(title) = title {
        xml.push_str(&format!("  <Title>{title}</Title>\n"));
    }
    if let Some(series) = series {
        xml.push_str(&format!("  <Series>{series}</Series>\n"));
    }
    xml.push_str("</ComicInfo>\n");
    xml
}

/// Write a `.cbz` at `path` holding an optional descriptor and `pages`
/// bytes of filler, stored uncompressed so the file size follows `pages`.
pub fn write_cbz(path: &Path, descriptor: Option<&str>, pages: usize) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }

    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    if let Some(xml) = descriptor {
        zip.start_file("ComicInfo.xml", options).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }
    zip.start_file("page001.jpg", options).unwrap();
    zip.write_all(&vec![0xAB; pages]).unwrap();
    zip.finish().unwrap();

    path.canonicalize().unwrap()
}

/// Scratch source and destination trees.
pub struct Library {
    pub source: TempDir,
    pub dest: TempDir,
}

impl Library {
    pub fn new() -> Self {
        // The default ".tmp" prefix would make the roots hidden
        Self {
            source: tempfile::Builder::new().prefix("comics").tempdir().unwrap(),
            dest: tempfile::Builder::new().prefix("links").tempdir().unwrap(),
        }
    }

    pub fn src(&self, relative: &str) -> PathBuf {
        self.source.path().join(relative)
    }

    pub fn link(&self, relative: &str) -> PathBuf {
        self.dest.path().join(relative)
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig::new(
            vec![self.source.path().to_path_buf()],
            self.dest.path().to_path_buf(),
        )
        .with_threads(4)
    }

    pub fn run(&self) -> RunStats {
        Pipeline::new(self.config()).run().unwrap()
    }
}

/// Whether `path` is a symlink, dangling or not.
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}

/// Every entry under `root`, relative and sorted.
pub fn tree(root: &Path) -> Vec<String> {
    let mut entries: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| {
            let e = e.unwrap();
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    entries.sort();
    entries
}
