#![cfg(unix)]

use std::fs;

use super::common::{comic_info, tree, write_cbz, Library};

fn populate(lib: &Library) {
    let info = comic_info(Some("Alpha"), Some("First"));
    write_cbz(&lib.src("SeriesA.T01.cbz"), Some(&info), 5000);
    write_cbz(&lib.src("SeriesA_T01_dup.cbz"), Some(&info), 3000);
    write_cbz(&lib.src("Beta/Beta 1.cbz"), None, 100);
}

#[test]
fn test_second_run_changes_nothing() {
    let lib = Library::new();
    populate(&lib);

    let first = lib.run();
    let after_first = tree(lib.dest.path());
    let targets: Vec<_> = ["Alpha/01.First.cbz", "Beta/Beta_1.cbz"]
        .iter()
        .map(|l| fs::read_link(lib.link(l)).unwrap())
        .collect();

    let second = lib.run();

    assert_eq!(tree(lib.dest.path()), after_first);
    let targets_again: Vec<_> = ["Alpha/01.First.cbz", "Beta/Beta_1.cbz"]
        .iter()
        .map(|l| fs::read_link(lib.link(l)).unwrap())
        .collect();
    assert_eq!(targets, targets_again);

    assert_eq!(first.links_already_present, 0);
    assert_eq!(second.links_already_present, 2);
    assert_eq!(second.symlinks_removed, 0);
    assert_eq!(second.errors, 0);

    // Per-group and per-file counters do not depend on whether the link was new
    assert_eq!(second.symlinks_created_comicinfo, first.symlinks_created_comicinfo);
    assert_eq!(second.symlinks_created_filename, first.symlinks_created_filename);
    assert_eq!(second.duplicates, first.duplicates);
}

#[test]
fn test_existing_entry_is_never_replaced() {
    let lib = Library::new();
    populate(&lib);

    // A user-placed file at a destination path stays untouched
    fs::create_dir_all(lib.link("Alpha")).unwrap();
    fs::write(lib.link("Alpha/01.First.cbz"), b"mine").unwrap();

    let stats = lib.run();

    assert_eq!(stats.links_already_present, 1);
    assert_eq!(fs::read(lib.link("Alpha/01.First.cbz")).unwrap(), b"mine");
}
