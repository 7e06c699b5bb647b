//! Extraction containment tests against hostile entry names.
//!
//! Archives are not trusted input. Whatever an entry calls itself, the
//! bytes must land inside the destination directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;
use ziptree_core::ExtractOptions;
use ziptree_core::ExtractStats;
use ziptree_core::NullTrace;
use ziptree_core::test_utils::ZipTestBuilder;

/// Extracts `bytes` into a subdirectory of `work`, so anything escaping
/// the destination would land in the still-private `work` root.
fn extract_bytes(bytes: &[u8], work: &Path) -> (ExtractStats, PathBuf) {
    let zipfile = work.join("hostile.zip");
    fs::write(&zipfile, bytes).unwrap();
    let dest = work.join("out");
    let stats =
        ziptree_core::extract_archive(&zipfile, &dest, &ExtractOptions::default(), &mut NullTrace)
            .unwrap();
    (stats, dest)
}

#[test]
fn test_parent_traversal_lands_inside_destination() {
    let bytes = ZipTestBuilder::new()
        .add_file("../evil.txt", b"escaped?")
        .add_file("../../../deeper/evil.txt", b"nested escape?")
        .build();

    let work = TempDir::new().unwrap();
    let (stats, dest) = extract_bytes(&bytes, work.path());

    assert_eq!(stats.files, 2);
    assert_eq!(fs::read(dest.join("evil.txt")).unwrap(), b"escaped?");
    assert_eq!(
        fs::read(dest.join("deeper/evil.txt")).unwrap(),
        b"nested escape?"
    );
    assert!(
        !work.path().join("evil.txt").exists(),
        "nothing written above the destination"
    );
}

#[test]
fn test_interior_parent_parts_are_dropped() {
    let bytes = ZipTestBuilder::new()
        .add_file("a/../../b.txt", b"hop")
        .build();

    let work = TempDir::new().unwrap();
    let (_, dest) = extract_bytes(&bytes, work.path());

    assert_eq!(fs::read(dest.join("a/b.txt")).unwrap(), b"hop");
    assert!(!work.path().join("b.txt").exists());
}

#[test]
fn test_absolute_names_are_re_rooted() {
    let bytes = ZipTestBuilder::new()
        .add_file("/etc/shadow-copy", b"not really")
        .build();

    let work = TempDir::new().unwrap();
    let (_, dest) = extract_bytes(&bytes, work.path());

    assert_eq!(
        fs::read(dest.join("etc/shadow-copy")).unwrap(),
        b"not really"
    );
    assert!(!Path::new("/etc/shadow-copy").exists());
}

#[test]
fn test_drive_prefixed_names_are_re_rooted() {
    let bytes = ZipTestBuilder::new()
        .add_file("C:\\Windows\\System32\\evil.dll", b"dll bytes")
        .add_file("D:/data/evil.txt", b"drive data")
        .build();

    let work = TempDir::new().unwrap();
    let (stats, dest) = extract_bytes(&bytes, work.path());

    assert_eq!(stats.files, 2);
    assert_eq!(
        fs::read(dest.join("Windows/System32/evil.dll")).unwrap(),
        b"dll bytes"
    );
    assert_eq!(fs::read(dest.join("data/evil.txt")).unwrap(), b"drive data");
}

#[test]
fn test_backslash_names_become_nested_paths() {
    let bytes = ZipTestBuilder::new()
        .add_file("made\\on\\windows.txt", b"dos style")
        .build();

    let work = TempDir::new().unwrap();
    let (_, dest) = extract_bytes(&bytes, work.path());

    assert_eq!(
        fs::read(dest.join("made/on/windows.txt")).unwrap(),
        b"dos style"
    );
}

#[test]
fn test_name_of_only_dots_extracts_to_root() {
    let bytes = ZipTestBuilder::new().add_directory("../").build();

    let work = TempDir::new().unwrap();
    let (stats, dest) = extract_bytes(&bytes, work.path());

    assert_eq!(stats.folders, 1, "entry resolved to the destination itself");
    assert!(dest.is_dir());
}

#[cfg(unix)]
#[test]
fn test_symlink_entry_name_is_contained_too() {
    let bytes = ZipTestBuilder::new()
        .add_symlink("../escape-link", "target.txt")
        .build();

    let work = TempDir::new().unwrap();
    let (stats, dest) = extract_bytes(&bytes, work.path());

    assert_eq!(stats.links, 1);
    let link = dest.join("escape-link");
    assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
    assert!(
        work.path().join("escape-link").symlink_metadata().is_err(),
        "link created inside the destination only"
    );
}
