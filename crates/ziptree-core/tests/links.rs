//! Symlink fidelity tests: links go in as links and come out as links.

#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::os::unix::fs::symlink;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;
use ziptree_core::CreateOptions;
use ziptree_core::ExtractOptions;
use ziptree_core::NullTrace;
use ziptree_core::create_archive;
use ziptree_core::extract_archive;
use ziptree_core::test_utils::ZipTestBuilder;

fn zip_and_unzip(root: &Path, create: &CreateOptions, extract: &ExtractOptions) -> (TempDir, PathBuf) {
    let work = TempDir::new().unwrap();
    let zipfile = work.path().join("archive.zip");
    create_archive(&zipfile, &[root], create, &mut NullTrace).unwrap();

    let dest = work.path().join("restored");
    extract_archive(&zipfile, &dest, extract, &mut NullTrace).unwrap();
    (work, dest)
}

fn basename_rooted() -> CreateOptions {
    CreateOptions::default().with_archive_root(Some(".".to_string()))
}

#[test]
fn test_relative_link_target_preserved() {
    let src = TempDir::new().unwrap();
    let root = src.path().join("tree");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("target.txt"), b"body").unwrap();
    symlink("target.txt", root.join("alias")).unwrap();

    let (_work, dest) = zip_and_unzip(&root, &basename_rooted(), &ExtractOptions::default());

    let alias = dest.join("tree/alias");
    assert!(alias.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(fs::read_link(&alias).unwrap(), Path::new("target.txt"));
    assert_eq!(fs::read(&alias).unwrap(), b"body", "link resolves in place");
}

#[test]
fn test_dangling_link_round_trip() {
    let src = TempDir::new().unwrap();
    let root = src.path().join("tree");
    fs::create_dir(&root).unwrap();
    symlink("never-created", root.join("broken")).unwrap();

    let work = TempDir::new().unwrap();
    let zipfile = work.path().join("archive.zip");
    let created = create_archive(&zipfile, &[&root], &basename_rooted(), &mut NullTrace).unwrap();
    assert_eq!(created.links, 1);

    let dest = work.path().join("restored");
    let extracted =
        extract_archive(&zipfile, &dest, &ExtractOptions::default(), &mut NullTrace).unwrap();
    assert_eq!(extracted.links, 1);

    let broken = dest.join("tree/broken");
    assert!(broken.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(fs::read_link(&broken).unwrap(), Path::new("never-created"));
}

#[test]
fn test_directory_link_round_trip() {
    let src = TempDir::new().unwrap();
    let root = src.path().join("tree");
    fs::create_dir_all(root.join("real_dir")).unwrap();
    fs::write(root.join("real_dir/inner.txt"), b"inside").unwrap();
    symlink("real_dir", root.join("dirlink")).unwrap();

    let (_work, dest) = zip_and_unzip(&root, &basename_rooted(), &ExtractOptions::default());

    let dirlink = dest.join("tree/dirlink");
    assert!(dirlink.symlink_metadata().unwrap().file_type().is_symlink());
    assert!(dirlink.is_dir(), "resolves to the extracted directory");
    assert_eq!(fs::read(dirlink.join("inner.txt")).unwrap(), b"inside");
}

#[test]
fn test_cycle_closed_by_link_copy_when_following() {
    let src = TempDir::new().unwrap();
    let root = src.path().join("tree");
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("sub/file.txt"), b"x").unwrap();
    symlink("..", root.join("sub/up")).unwrap();

    let work = TempDir::new().unwrap();
    let zipfile = work.path().join("archive.zip");
    let options = basename_rooted().with_follow_links(true);
    let created = create_archive(&zipfile, &[&root], &options, &mut NullTrace).unwrap();
    assert_eq!(created.links, 1, "the cycle edge became a link copy");
    assert_eq!(created.files, 1);

    let dest = work.path().join("restored");
    extract_archive(&zipfile, &dest, &ExtractOptions::default(), &mut NullTrace).unwrap();
    assert_eq!(
        fs::read_link(dest.join("tree/sub/up")).unwrap(),
        Path::new("..")
    );
}

#[test]
fn test_backslash_target_fixed_to_host_separator() {
    let bytes = ZipTestBuilder::new()
        .add_symlink("portable", "sub\\dir\\file")
        .build();

    let work = TempDir::new().unwrap();
    let zipfile = work.path().join("archive.zip");
    fs::write(&zipfile, &bytes).unwrap();
    let dest = work.path().join("out");
    extract_archive(&zipfile, &dest, &ExtractOptions::default(), &mut NullTrace).unwrap();

    assert_eq!(
        fs::read_link(dest.join("portable")).unwrap(),
        Path::new("sub/dir/file")
    );
}

#[test]
fn test_backslash_target_kept_when_fixing_disabled() {
    let bytes = ZipTestBuilder::new()
        .add_symlink("portable", "sub\\dir\\file")
        .build();

    let work = TempDir::new().unwrap();
    let zipfile = work.path().join("archive.zip");
    fs::write(&zipfile, &bytes).unwrap();
    let dest = work.path().join("out");
    extract_archive(
        &zipfile,
        &dest,
        &ExtractOptions::default().with_fix_link_separators(false),
        &mut NullTrace,
    )
    .unwrap();

    assert_eq!(
        fs::read_link(dest.join("portable")).unwrap(),
        Path::new("sub\\dir\\file"),
        "target text kept verbatim"
    );
}

#[test]
fn test_link_targets_are_data_not_paths() {
    let bytes = ZipTestBuilder::new()
        .add_symlink("reach-up", "../../outside")
        .add_symlink("reach-root", "/usr/bin/env")
        .build();

    let work = TempDir::new().unwrap();
    let zipfile = work.path().join("archive.zip");
    fs::write(&zipfile, &bytes).unwrap();
    let dest = work.path().join("out");
    let stats =
        extract_archive(&zipfile, &dest, &ExtractOptions::default(), &mut NullTrace).unwrap();

    assert_eq!(stats.links, 2);
    assert_eq!(
        fs::read_link(dest.join("reach-up")).unwrap(),
        Path::new("../../outside"),
        "targets pass through untouched"
    );
    assert_eq!(
        fs::read_link(dest.join("reach-root")).unwrap(),
        Path::new("/usr/bin/env")
    );
}

#[test]
fn test_link_replaces_existing_file_at_destination() {
    let bytes = ZipTestBuilder::new()
        .add_symlink("spot", "target.txt")
        .build();

    let work = TempDir::new().unwrap();
    let zipfile = work.path().join("archive.zip");
    fs::write(&zipfile, &bytes).unwrap();
    let dest = work.path().join("out");
    fs::create_dir_all(&dest).unwrap();
    fs::write(dest.join("spot"), b"old regular file").unwrap();

    extract_archive(&zipfile, &dest, &ExtractOptions::default(), &mut NullTrace).unwrap();

    let spot = dest.join("spot");
    assert!(spot.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(fs::read_link(&spot).unwrap(), Path::new("target.txt"));
}

#[test]
fn test_link_modtime_round_trip() {
    let src = TempDir::new().unwrap();
    let root = src.path().join("tree");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("target.txt"), b"x").unwrap();
    symlink("target.txt", root.join("alias")).unwrap();
    let stamp = filetime::FileTime::from_unix_time(1_300_000_000, 0);
    filetime::set_symlink_file_times(root.join("alias"), stamp, stamp).unwrap();

    let (_work, dest) = zip_and_unzip(&root, &basename_rooted(), &ExtractOptions::default());

    let meta = dest.join("tree/alias").symlink_metadata().unwrap();
    assert_eq!(
        filetime::FileTime::from_last_modification_time(&meta).unix_seconds(),
        1_300_000_000,
        "modtime belongs to the link, not its target"
    );
}
