#![cfg(unix)]

use std::fs;

use comiclink::classify::Classifier;
use comiclink::pipeline::Pipeline;

use super::common::{comic_info, is_symlink, tree, write_cbz, Library};

#[test]
fn test_missing_descriptor_links_by_directory() {
    let lib = Library::new();
    let target = write_cbz(&lib.src("Beta/Beta 1.cbz"), None, 100);

    let stats = lib.run();

    assert_eq!(stats.total_files, 1);
    assert_eq!(stats.files_without_comicinfo, 1);
    assert_eq!(stats.symlinks_created_filename, 1);
    assert_eq!(stats.errors, 0);

    let link = lib.link("Beta/Beta_1.cbz");
    assert!(is_symlink(&link));
    assert_eq!(fs::read_link(&link).unwrap(), target);
}

#[test]
fn test_non_zip_formats_fall_back_quietly() {
    let lib = Library::new();
    fs::create_dir_all(lib.src("Scans")).unwrap();
    fs::write(lib.src("Scans/Old Issue.pdf"), b"%PDF-1.4").unwrap();
    fs::write(lib.src("Scans/Other Issue.cbr"), b"Rar!").unwrap();

    let stats = lib.run();

    assert_eq!(stats.files_without_comicinfo, 2);
    assert_eq!(stats.symlinks_created_filename, 2);
    assert_eq!(stats.errors, 0);
    assert_eq!(
        tree(lib.dest.path()),
        vec!["Scans", "Scans/Old_Issue.pdf", "Scans/Other_Issue.cbr"]
    );
}

#[test]
fn test_corrupt_cbz_counts_error_but_is_linked() {
    let lib = Library::new();
    fs::create_dir_all(lib.src("Broken")).unwrap();
    fs::write(lib.src("Broken/bad.cbz"), b"not a zip at all").unwrap();
    write_cbz(
        &lib.src("Good.T01.cbz"),
        Some(&comic_info(Some("Good"), Some("One"))),
        100,
    );

    let stats = lib.run();

    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.errors, 1);
    assert!(stats.has_errors());
    assert!(is_symlink(&lib.link("Broken/bad.cbz")));
    assert!(is_symlink(&lib.link("Good/01.One.cbz")));
}

#[test]
fn test_empty_descriptor_is_dropped_by_default() {
    let lib = Library::new();
    write_cbz(&lib.src("Gamma/empty.cbz"), Some(&comic_info(None, None)), 100);

    let stats = lib.run();

    assert_eq!(stats.files_with_comicinfo, 1);
    assert_eq!(stats.files_with_missing_info, 1);
    assert_eq!(stats.symlinks_created_comicinfo, 0);
    assert_eq!(stats.symlinks_created_filename, 0);
    assert!(tree(lib.dest.path()).is_empty());
}

#[test]
fn test_empty_descriptor_with_fallback_enabled() {
    let lib = Library::new();
    write_cbz(
        &lib.src("Gamma/empty.cbz"),
        Some(&comic_info(Some("  "), Some(""))),
        100,
    );

    let classifier = Classifier::default().with_missing_info_fallback(true);
    let stats = Pipeline::new(lib.config().with_classifier(classifier))
        .run()
        .unwrap();

    assert_eq!(stats.files_with_missing_info, 1);
    assert_eq!(stats.symlinks_created_filename, 1);
    assert!(is_symlink(&lib.link("Gamma/empty.cbz")));
}

#[test]
fn test_fallback_series_sanitized() {
    let lib = Library::new();
    write_cbz(&lib.src("Les Schtroumpfs (Intégrale)/tome 1.cbz"), None, 10);

    lib.run();

    assert!(is_symlink(
        &lib.link("Les_Schtroumpfs_Integrale/tome_1.cbz")
    ));
}
