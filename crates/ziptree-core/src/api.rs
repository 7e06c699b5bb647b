//! High-level public API for archive creation and extraction.

use std::fs::File;
use std::path::Path;

use zip::ZipArchive;

use crate::Result;
use crate::create;
use crate::error::ArchiveError;
use crate::extract;
use crate::options::CreateOptions;
use crate::options::ExtractOptions;
use crate::platform;
use crate::stats::CreateStats;
use crate::stats::ExtractStats;
use crate::trace::TraceSink;

/// Creates a ZIP archive from source files, directories, and links.
///
/// Directories are walked recursively. Symbolic links are stored as
/// links unless `options.follow_links` asks for their referents. Item
/// modtimes are recorded both as local DOS times and as UTC timestamps,
/// so archives made here survive DST and timezone changes when they are
/// extracted here.
///
/// # Arguments
///
/// * `output` - Path of the zipfile to write
/// * `sources` - Files, directories, and links to add
/// * `options` - Creation behavior switches
/// * `trace` - Sink receiving one event per item visited
///
/// # Errors
///
/// Returns an error if:
/// - The output file cannot be created
/// - A source or one of its children cannot be read
/// - Writing archive data fails
///
/// # Examples
///
/// ```no_run
/// use ziptree_core::CreateOptions;
/// use ziptree_core::NullTrace;
/// use ziptree_core::create_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = CreateOptions::default();
/// let stats = create_archive("backup.zip", &["photos", "notes.txt"], &options, &mut NullTrace)?;
/// println!("Archived {} files", stats.files);
/// # Ok(())
/// # }
/// ```
pub fn create_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    output: P,
    sources: &[Q],
    options: &CreateOptions,
    trace: &mut dyn TraceSink,
) -> Result<CreateStats> {
    let output = output.as_ref();
    let file = File::create(platform::host_path(output)).map_err(|err| ArchiveError::Open {
        path: output.to_path_buf(),
        source: err,
    })?;

    let sources: Vec<&Path> = sources.iter().map(AsRef::as_ref).collect();
    create::create_into(file, &sources, options, trace)
}

/// Extracts a ZIP archive into a destination directory.
///
/// Every entry is materialized inside `destination`; entry names with
/// parent references or drive prefixes are stripped down until they fit.
/// Symlink entries become real links where the platform allows. File
/// modtimes are restored immediately, directory modtimes after all
/// content is in place.
///
/// # Arguments
///
/// * `archive` - Path of the zipfile to read
/// * `destination` - Directory receiving the extracted tree
/// * `options` - Extraction behavior switches
/// * `trace` - Sink receiving one event per entry extracted
///
/// # Errors
///
/// Returns an error if:
/// - The archive cannot be opened or is not a zipfile
/// - An entry's content cannot be read back
/// - Creating files or directories under `destination` fails
///
/// # Examples
///
/// ```no_run
/// use ziptree_core::ExtractOptions;
/// use ziptree_core::NullTrace;
/// use ziptree_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = ExtractOptions::default();
/// let stats = extract_archive("backup.zip", "restored", &options, &mut NullTrace)?;
/// println!("Restored {} files", stats.files);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive: P,
    destination: Q,
    options: &ExtractOptions,
    trace: &mut dyn TraceSink,
) -> Result<ExtractStats> {
    let archive = archive.as_ref();
    let file = File::open(platform::host_path(archive)).map_err(|err| ArchiveError::Open {
        path: archive.to_path_buf(),
        source: err,
    })?;

    let mut zip = ZipArchive::new(file)?;
    extract::extract_into(&mut zip, destination.as_ref(), options, trace)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::trace::NullTrace;
    use tempfile::TempDir;

    #[test]
    fn test_create_then_extract_round_trip() {
        let src = TempDir::new().unwrap();
        let root = src.path().join("tree");
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::write(root.join("a.txt"), b"alpha").unwrap();
        std::fs::write(root.join("sub/b.txt"), b"beta").unwrap();

        let work = TempDir::new().unwrap();
        let zipfile = work.path().join("out.zip");
        let options = CreateOptions::default().with_archive_root(Some(".".to_string()));
        let created = create_archive(&zipfile, &[&root], &options, &mut NullTrace).unwrap();
        assert_eq!(created.files, 2);
        assert_eq!(created.folders, 2);

        let dest = work.path().join("restored");
        let extracted =
            extract_archive(&zipfile, &dest, &ExtractOptions::default(), &mut NullTrace).unwrap();
        assert_eq!(extracted.files, 2);
        assert_eq!(
            std::fs::read(dest.join("tree/sub/b.txt")).unwrap(),
            b"beta"
        );
    }

    #[test]
    fn test_create_archive_unwritable_output() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("a.txt"), b"x").unwrap();

        let result = create_archive(
            src.path().join("no-such-dir/out.zip"),
            &[src.path().join("a.txt")],
            &CreateOptions::default(),
            &mut NullTrace,
        );

        match result {
            Err(ArchiveError::Open { path, .. }) => {
                assert!(path.ends_with("no-such-dir/out.zip"));
            }
            other => panic!("expected an open error, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_archive_missing_file() {
        let dest = TempDir::new().unwrap();
        let result = extract_archive(
            dest.path().join("missing.zip"),
            dest.path(),
            &ExtractOptions::default(),
            &mut NullTrace,
        );
        assert!(matches!(result, Err(ArchiveError::Open { .. })));
    }

    #[test]
    fn test_extract_archive_not_a_zipfile() {
        let work = TempDir::new().unwrap();
        let bogus = work.path().join("bogus.zip");
        std::fs::write(&bogus, b"this is not a zipfile").unwrap();

        let result = extract_archive(
            &bogus,
            work.path().join("out"),
            &ExtractOptions::default(),
            &mut NullTrace,
        );
        assert!(matches!(result, Err(ArchiveError::Container(_))));
    }
}
