#![cfg(unix)]

use std::fs;
use std::path::PathBuf;

use comiclink::classify::{Classifier, VolumeMatcher};
use comiclink::pipeline::Pipeline;

use super::common::{comic_info, is_symlink, tree, write_cbz, Library};

#[test]
fn test_largest_copy_wins() {
    let lib = Library::new();
    let info = comic_info(Some("Alpha"), Some("First"));
    let big = write_cbz(&lib.src("SeriesA.T01.cbz"), Some(&info), 5000);
    write_cbz(&lib.src("SeriesA_T01_dup.cbz"), Some(&info), 3000);

    let stats = lib.run();

    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.files_with_comicinfo, 2);
    assert_eq!(stats.symlinks_created_comicinfo, 1);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.errors, 0);

    let link = lib.link("Alpha/01.First.cbz");
    assert!(is_symlink(&link));
    assert_eq!(fs::read_link(&link).unwrap(), big);
    assert_eq!(tree(lib.dest.path()), vec!["Alpha", "Alpha/01.First.cbz"]);
}

#[test]
fn test_equal_sizes_first_seen_wins() {
    let lib = Library::new();
    let info = comic_info(Some("Alpha"), Some("First"));
    // Walk order is name order: "a_first" precedes "b_second"
    let first = write_cbz(&lib.src("a_first/Alpha.T1.cbz"), Some(&info), 1000);
    write_cbz(&lib.src("b_second/Alpha.T1.cbz"), Some(&info), 1000);

    let stats = lib.run();

    assert_eq!(stats.duplicates, 1);
    assert_eq!(
        fs::read_link(lib.link("Alpha/01.First.cbz")).unwrap(),
        first
    );
}

#[test]
fn test_volumes_are_separate_groups() {
    let lib = Library::new();
    write_cbz(
        &lib.src("Gaston.T01.cbz"),
        Some(&comic_info(Some("Gaston"), Some("Gala de gaffes"))),
        100,
    );
    write_cbz(
        &lib.src("Gaston.T12.cbz"),
        Some(&comic_info(Some("Gaston"), Some("Gaffes à gogo"))),
        100,
    );

    let stats = lib.run();

    assert_eq!(stats.symlinks_created_comicinfo, 2);
    assert_eq!(stats.duplicates, 0);
    assert_eq!(
        tree(lib.dest.path()),
        vec![
            "Gaston",
            "Gaston/01.Gala_de_gaffes.cbz",
            "Gaston/12.Gaffes_a_gogo.cbz"
        ]
    );
}

#[test]
fn test_no_volume_uses_file_name() {
    let lib = Library::new();
    write_cbz(
        &lib.src("Hors série (spécial).cbz"),
        Some(&comic_info(Some("Astérix"), Some("Album spécial"))),
        100,
    );

    let stats = lib.run();

    assert_eq!(stats.symlinks_created_comicinfo, 1);
    assert!(is_symlink(&lib.link("Asterix/Hors_serie_special.cbz")));
}

#[test]
fn test_title_only_descriptor_is_grouped() {
    let lib = Library::new();
    write_cbz(&lib.src("x.T3.cbz"), Some(&comic_info(None, Some("Lonely"))), 100);

    let stats = lib.run();

    assert_eq!(stats.files_with_missing_info, 0);
    assert!(is_symlink(&lib.link("NA/03.Lonely.cbz")));
}

#[test]
fn test_copies_across_sources_are_grouped() {
    let lib = Library::new();
    let other = tempfile::Builder::new().prefix("archive").tempdir().unwrap();
    let info = comic_info(Some("Alpha"), Some("First"));
    write_cbz(&lib.src("Alpha.T01.cbz"), Some(&info), 200);
    let bigger = write_cbz(&other.path().join("Alpha.T01.cbz"), Some(&info), 900);

    let mut config = lib.config();
    config.sources.push(other.path().to_path_buf());
    let stats = Pipeline::new(config).run().unwrap();

    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(
        fs::read_link(lib.link("Alpha/01.First.cbz")).unwrap(),
        bigger
    );
}

#[test]
fn test_custom_volume_pattern() {
    let lib = Library::new();
    write_cbz(
        &lib.src("Saga #7.cbz"),
        Some(&comic_info(Some("Saga"), Some("Chapter Seven"))),
        100,
    );

    let classifier = Classifier::new(VolumeMatcher::new(r"#(\d+)").unwrap());
    let stats = Pipeline::new(lib.config().with_classifier(classifier))
        .run()
        .unwrap();

    assert_eq!(stats.symlinks_created_comicinfo, 1);
    assert!(is_symlink(&lib.link("Saga/07.Chapter_Seven.cbz")));
}

#[test]
fn test_extension_match_is_case_insensitive() {
    let lib = Library::new();
    write_cbz(
        &lib.src("LOUD.T02.CBZ"),
        Some(&comic_info(Some("Loud"), Some("Two"))),
        100,
    );
    fs::write(lib.src("cover.jpg"), b"jpeg").unwrap();

    let stats = lib.run();

    assert_eq!(stats.total_files, 1);
    let link: PathBuf = lib.link("Loud/02.Two.CBZ");
    assert!(is_symlink(&link));
}

#[test]
fn test_unwritable_destination_aborts() {
    let lib = Library::new();
    write_cbz(
        &lib.src("Alpha.T01.cbz"),
        Some(&comic_info(Some("Alpha"), Some("First"))),
        100,
    );
    // A regular file where the series directory should go
    fs::write(lib.link("Alpha"), b"in the way").unwrap();

    assert!(Pipeline::new(lib.config()).run().is_err());
}
