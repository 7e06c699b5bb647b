//! Archive creation: tree traversal and entry writing.
//!
//! Each source is classified and dispatched; directories are walked with
//! explicit recursion so every visited path stays available both in host
//! form (for filesystem calls) and archive form (for stored names). Links
//! are archived as links unless configured otherwise, and a followed link
//! that would re-enter a directory already on the traversal path is stored
//! as a link instead of recursed into.

use std::fs;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use zip::CompressionMethod;
use zip::write::FullFileOptions;
use zip::write::ZipWriter;

use crate::error::ArchiveError;
use crate::error::Result;
use crate::link;
use crate::mtime;
use crate::options::CreateOptions;
use crate::paths;
use crate::platform;
use crate::platform::FileId;
use crate::stats::CreateStats;
use crate::trace::TraceEvent;
use crate::trace::TraceSink;

/// Copy buffer for file content.
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Writes an archive of `sources` into `writer` and returns the counters.
pub(crate) fn create_into<W: Write + Seek>(
    writer: W,
    sources: &[&Path],
    options: &CreateOptions,
    trace: &mut dyn TraceSink,
) -> Result<CreateStats> {
    debug!("Creating archive from {} sources", sources.len());

    let mut zip = ZipWriter::new(writer);
    let mut stats = CreateStats::new();
    for source in sources {
        add_top_item(&mut zip, source, options, &mut stats, trace)?;
    }
    zip.finish()?;

    debug!("Archive complete: {stats}");
    Ok(stats)
}

/// Classifies and adds one top-level source.
///
/// `.` and `..` sources are exempt from the cruft filter; other sources
/// are matched by their final name, like any walked item.
fn add_top_item<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    source: &Path,
    options: &CreateOptions,
    stats: &mut CreateStats,
    trace: &mut dyn TraceSink,
) -> Result<()> {
    let raw = source.to_string_lossy();
    let seed = paths::archive_seed(source, options.archive_root.as_deref());
    let host = platform::host_path(source);

    let followed = fs::metadata(&host).ok();
    let is_link = fs::symlink_metadata(&host)
        .ok()
        .is_some_and(|meta| meta.file_type().is_symlink());

    let exempt = raw == "." || raw == "..";
    if !exempt
        && options
            .cruft
            .as_ref()
            .is_some_and(|rules| rules.is_cruft(paths::base_name(&raw)))
    {
        stats.cruft_skipped += 1;
        trace.event(TraceEvent::SkippedCruft { source });
        return Ok(());
    }

    if is_link && !options.follow_links {
        stats.links += 1;
        trace.event(TraceEvent::AddingLink {
            source,
            archive_path: &seed,
        });
        return link::write_symlink_entry(zip, source, &seed, trace);
    }

    if followed.as_ref().is_some_and(fs::Metadata::is_file) {
        stats.files += 1;
        trace.event(TraceEvent::AddingFile {
            source,
            archive_path: &seed,
        });
        return write_file_entry(zip, source, &seed);
    }

    if followed.as_ref().is_some_and(fs::Metadata::is_dir) {
        let mut chain = ancestor_identities(source);
        return add_tree(zip, source, &seed, options, stats, &mut chain, trace);
    }

    stats.unsupported += 1;
    trace.event(TraceEvent::SkippedUnsupported { source });
    Ok(())
}

/// Adds a directory and everything below it.
///
/// The directory's own entry is written first, then each child is
/// classified in turn. `chain` holds the identities of every directory on
/// the traversal path above and including this one, for cycle checks when
/// links are being followed.
#[allow(clippy::too_many_lines)]
fn add_tree<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    dir: &Path,
    archive_path: &str,
    options: &CreateOptions,
    stats: &mut CreateStats,
    chain: &mut Vec<FileId>,
    trace: &mut dyn TraceSink,
) -> Result<()> {
    if options.store_empty_dirs && !archive_path.is_empty() {
        stats.folders += 1;
        trace.event(TraceEvent::AddingFolder {
            source: dir,
            archive_path,
        });
        write_dir_entry(zip, dir, archive_path)?;
    }

    let pushed = match platform::file_identity(dir) {
        Ok(Some(id)) => {
            chain.push(id);
            true
        }
        _ => false,
    };

    let host = platform::host_path(dir);
    let listing = fs::read_dir(&host).map_err(|err| ArchiveError::Item {
        path: dir.to_path_buf(),
        source: err,
    })?;

    for entry in listing {
        let entry = entry.map_err(|err| ArchiveError::Item {
            path: dir.to_path_buf(),
            source: err,
        })?;
        let name = entry.file_name();
        let item = dir.join(&name);
        let display = name.to_string_lossy();
        let child_path = paths::extend_archive_path(archive_path, &display);

        let child_host = platform::host_path(&item);
        let followed = fs::metadata(&child_host).ok();
        let is_link = fs::symlink_metadata(&child_host)
            .ok()
            .is_some_and(|meta| meta.file_type().is_symlink());
        let cruft = options
            .cruft
            .as_ref()
            .is_some_and(|rules| rules.is_cruft(&display));

        if followed.as_ref().is_some_and(fs::Metadata::is_dir) {
            if cruft {
                stats.cruft_skipped += 1;
                trace.event(TraceEvent::SkippedCruft { source: &item });
            } else if options.follow_links {
                if is_link && is_recursive_link(&item, chain) {
                    stats.links += 1;
                    trace.event(TraceEvent::RecursiveLinkCopied { source: &item });
                    link::write_symlink_entry(zip, &item, &child_path, trace)?;
                } else {
                    add_tree(zip, &item, &child_path, options, stats, chain, trace)?;
                }
            } else if is_link {
                stats.links += 1;
                trace.event(TraceEvent::AddingLink {
                    source: &item,
                    archive_path: &child_path,
                });
                link::write_symlink_entry(zip, &item, &child_path, trace)?;
            } else {
                add_tree(zip, &item, &child_path, options, stats, chain, trace)?;
            }
        } else if followed.as_ref().is_some_and(fs::Metadata::is_file) {
            if cruft {
                stats.cruft_skipped += 1;
                trace.event(TraceEvent::SkippedCruft { source: &item });
            } else if is_link && !options.follow_links {
                stats.links += 1;
                trace.event(TraceEvent::AddingLink {
                    source: &item,
                    archive_path: &child_path,
                });
                link::write_symlink_entry(zip, &item, &child_path, trace)?;
            } else {
                stats.files += 1;
                trace.event(TraceEvent::AddingFile {
                    source: &item,
                    archive_path: &child_path,
                });
                write_file_entry(zip, &item, &child_path)?;
            }
        } else if is_link {
            // dangling or pointing at something that is neither file nor
            // dir; the link itself is still real content
            if cruft {
                stats.cruft_skipped += 1;
                trace.event(TraceEvent::SkippedCruft { source: &item });
            } else {
                stats.links += 1;
                trace.event(TraceEvent::AddingLink {
                    source: &item,
                    archive_path: &child_path,
                });
                link::write_symlink_entry(zip, &item, &child_path, trace)?;
            }
        } else {
            stats.unsupported += 1;
            trace.event(TraceEvent::SkippedUnsupported { source: &item });
        }
    }

    if pushed {
        chain.pop();
    }
    Ok(())
}

/// Identities of every path prefix above the source item itself, so a
/// followed link pointing back at a source ancestor is caught even at the
/// top of the walk.
fn ancestor_identities(source: &Path) -> Vec<FileId> {
    let mut chain = Vec::new();
    if !platform::supports_file_identity() {
        return chain;
    }
    let mut components: Vec<_> = source.components().collect();
    components.pop();

    let mut prefix = PathBuf::new();
    for component in components {
        prefix.push(component.as_os_str());
        if let Ok(Some(id)) = platform::file_identity(&prefix) {
            chain.push(id);
        }
    }
    chain
}

/// Reports whether following `link` would re-enter a directory already on
/// the traversal path.
fn is_recursive_link(link: &Path, chain: &[FileId]) -> bool {
    match platform::file_identity(link) {
        Ok(Some(id)) => chain.contains(&id),
        _ => false,
    }
}

/// Writes one regular file entry with its content, permissions, and times.
fn write_file_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    source: &Path,
    archive_path: &str,
) -> Result<()> {
    let host = platform::host_path(source);
    let mut file = fs::File::open(&host).map_err(|err| ArchiveError::Item {
        path: source.to_path_buf(),
        source: err,
    })?;
    let meta = file.metadata().map_err(|err| ArchiveError::Item {
        path: source.to_path_buf(),
        source: err,
    })?;

    let mtime_secs = source_mtime(&meta, source)?;
    let mut options = FullFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(mtime::dos_time_from_epoch(mtime_secs))
        .large_file(meta.len() >= u64::from(u32::MAX));
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        options = options.unix_permissions(meta.permissions().mode());
    }
    options.add_extra_data(
        mtime::EXTENDED_TIMESTAMP_ID,
        mtime::encode_extended_timestamp(mtime_secs),
        false,
    )?;

    zip.start_file(archive_path, options)?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let bytes_read = file.read(&mut buffer).map_err(|err| ArchiveError::Item {
            path: source.to_path_buf(),
            source: err,
        })?;
        if bytes_read == 0 {
            break;
        }
        zip.write_all(&buffer[..bytes_read])
            .map_err(ArchiveError::Io)?;
    }
    Ok(())
}

/// Writes one directory entry: zero-length, stored, named with a trailing
/// slash.
fn write_dir_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    source: &Path,
    archive_path: &str,
) -> Result<()> {
    let host = platform::host_path(source);
    let meta = fs::metadata(&host).map_err(|err| ArchiveError::Item {
        path: source.to_path_buf(),
        source: err,
    })?;

    let mtime_secs = source_mtime(&meta, source)?;
    let mut options = FullFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(mtime::dos_time_from_epoch(mtime_secs));
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        options = options.unix_permissions(meta.permissions().mode());
    }
    options.add_extra_data(
        mtime::EXTENDED_TIMESTAMP_ID,
        mtime::encode_extended_timestamp(mtime_secs),
        false,
    )?;

    let name = format!("{archive_path}/");
    zip.add_directory(name.as_str(), options)?;
    Ok(())
}

fn source_mtime(meta: &fs::Metadata, source: &Path) -> Result<i64> {
    let modified = meta.modified().map_err(|err| ArchiveError::Item {
        path: source.to_path_buf(),
        source: err,
    })?;
    Ok(mtime::epoch_seconds(modified))
}
