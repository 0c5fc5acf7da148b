#![cfg(unix)]

use std::fs;
use std::os::unix::fs::symlink;

use comiclink::reaper::reap_stale_links;

use super::common::{comic_info, is_symlink, write_cbz, Library};

#[test]
fn test_deleted_source_link_is_removed() {
    let lib = Library::new();
    write_cbz(
        &lib.src("Alpha.T01.cbz"),
        Some(&comic_info(Some("Alpha"), Some("First"))),
        100,
    );
    let doomed = write_cbz(&lib.src("Beta/Beta 2.cbz"), None, 100);
    lib.run();
    assert!(is_symlink(&lib.link("Beta/Beta_2.cbz")));

    fs::remove_file(doomed).unwrap();
    let stats = lib.run();

    assert_eq!(stats.symlinks_removed, 1);
    assert!(!is_symlink(&lib.link("Beta/Beta_2.cbz")));
    assert!(is_symlink(&lib.link("Alpha/01.First.cbz")));
}

#[test]
fn test_replaced_winner_is_relinked_on_next_run() {
    let lib = Library::new();
    let info = comic_info(Some("Alpha"), Some("First"));
    let big = write_cbz(&lib.src("SeriesA.T01.cbz"), Some(&info), 5000);
    let small = write_cbz(&lib.src("SeriesA_T01_dup.cbz"), Some(&info), 3000);
    let link = lib.link("Alpha/01.First.cbz");

    lib.run();
    assert_eq!(fs::read_link(&link).unwrap(), big);

    // The stale link still occupies the destination while publishing, so
    // this run only removes it
    fs::remove_file(&big).unwrap();
    let stats = lib.run();
    assert_eq!(stats.links_already_present, 1);
    assert_eq!(stats.symlinks_removed, 1);
    assert!(!is_symlink(&link));

    lib.run();
    assert_eq!(fs::read_link(&link).unwrap(), small);
}

#[test]
fn test_foreign_entries_survive_cleanup() {
    let lib = Library::new();
    let keep = lib.src("keep.bin");
    fs::write(&keep, b"k").unwrap();

    fs::create_dir_all(lib.link("Misc")).unwrap();
    fs::write(lib.link("Misc/readme.txt"), b"hello").unwrap();
    symlink(&keep, lib.link("Misc/live")).unwrap();
    symlink(lib.src("missing.bin"), lib.link("Misc/dead")).unwrap();

    let report = reap_stale_links(lib.dest.path());

    assert_eq!(report.removed, vec![lib.link("Misc/dead")]);
    assert!(lib.link("Misc/readme.txt").exists());
    assert!(is_symlink(&lib.link("Misc/live")));
}

#[test]
fn test_chained_link_follows_existence() {
    let lib = Library::new();
    let target = lib.src("real.cbz");
    fs::write(&target, b"r").unwrap();
    let hop = lib.src("hop.cbz");
    symlink(&target, &hop).unwrap();
    symlink(&hop, lib.link("chained.cbz")).unwrap();

    assert!(reap_stale_links(lib.dest.path()).removed.is_empty());

    // The immediate target is still there, but it no longer leads anywhere
    fs::remove_file(&target).unwrap();
    let report = reap_stale_links(lib.dest.path());

    assert_eq!(report.removed, vec![lib.link("chained.cbz")]);
    assert!(is_symlink(&hop));
}
