//! Archive extraction: entry materialization under a contained root.
//!
//! Every entry lands inside the destination directory no matter what its
//! stored name says. Symlink entries become real links where the platform
//! allows, stub files otherwise. File modtimes are restored as each file
//! is written; directory modtimes are restored only after the whole
//! archive has been walked, since writing children would clobber them.

use std::fs;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use zip::HasZipMetadata;
use zip::ZipArchive;

use crate::error::ArchiveError;
use crate::error::Result;
use crate::link;
use crate::link::LinkOutcome;
use crate::mtime;
use crate::options::ExtractOptions;
use crate::paths;
use crate::platform;
use crate::stats::ExtractStats;
use crate::trace::TraceEvent;
use crate::trace::TraceSink;
use crate::trace::TraceWarning;

/// Copy buffer for file content.
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Extracts every entry of `archive` under `destination` and returns the
/// counters.
pub(crate) fn extract_into<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    destination: &Path,
    options: &ExtractOptions,
    trace: &mut dyn TraceSink,
) -> Result<ExtractStats> {
    debug!(
        "Extracting {} entries to {:?}",
        archive.len(),
        destination
    );

    let mut stats = ExtractStats::new();
    let mut deferred_dirs: Vec<(PathBuf, i64)> = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        let destpath = paths::entry_destination(destination, &name);
        let attrs = u64::from(entry.get_metadata().external_attributes);
        let mtime_secs = mtime::stored_mtime(&entry);

        if link::is_symlink_entry(attrs) {
            let mut payload = Vec::new();
            entry
                .read_to_end(&mut payload)
                .map_err(ArchiveError::Io)?;
            let outcome =
                link::materialize_symlink(&payload, &name, attrs, &destpath, options, trace)?;
            trace.event(TraceEvent::Extracted {
                archive_path: &name,
                destination: &destpath,
                link: true,
            });

            match outcome {
                LinkOutcome::Link => {
                    stats.links += 1;
                    if platform::can_set_link_mtime()
                        && let Some(secs) = mtime_secs
                        && mtime::restore_link_mtime(&destpath, secs).is_err()
                    {
                        trace.event(TraceEvent::Warning(TraceWarning::ModTimeNotSet {
                            destination: &destpath,
                        }));
                    }
                }
                LinkOutcome::Stub => {
                    // the stub is an ordinary file and gets file treatment
                    stats.files += 1;
                    if options.propagate_permissions {
                        apply_permissions(&destpath, attrs, trace);
                    }
                    restore_file_mtime(&destpath, mtime_secs, trace);
                }
                LinkOutcome::Failed => {
                    stats.unsupported += 1;
                }
            }
            continue;
        }

        if entry.is_dir() {
            let host = platform::host_path(&destpath);
            fs::create_dir_all(&host).map_err(|err| ArchiveError::Item {
                path: destpath.clone(),
                source: err,
            })?;
            stats.folders += 1;
            trace.event(TraceEvent::Extracted {
                archive_path: &name,
                destination: &destpath,
                link: false,
            });

            if options.propagate_permissions {
                apply_permissions(&destpath, attrs, trace);
            }
            if let Some(secs) = mtime_secs {
                deferred_dirs.push((destpath, secs));
            }
            continue;
        }

        write_file_content(&mut entry, &destpath)?;
        stats.files += 1;
        trace.event(TraceEvent::Extracted {
            archive_path: &name,
            destination: &destpath,
            link: false,
        });

        if options.propagate_permissions {
            apply_permissions(&destpath, attrs, trace);
        }
        restore_file_mtime(&destpath, mtime_secs, trace);
    }

    // children are all in place now; restore in archive order
    for (dir, secs) in &deferred_dirs {
        if mtime::restore_mtime(dir, *secs).is_err() {
            trace.event(TraceEvent::Warning(TraceWarning::ModTimeNotSet {
                destination: dir,
            }));
        }
    }

    debug!("Extraction complete: {stats}");
    Ok(stats)
}

/// Streams one entry's content into a fresh file, creating parents first.
fn write_file_content<R: Read>(entry: &mut R, destpath: &Path) -> Result<()> {
    let host = platform::host_path(destpath);
    if let Some(parent) = host.parent() {
        fs::create_dir_all(parent).map_err(|err| ArchiveError::Item {
            path: destpath.to_path_buf(),
            source: err,
        })?;
    }
    let mut out = fs::File::create(&host).map_err(|err| ArchiveError::Item {
        path: destpath.to_path_buf(),
        source: err,
    })?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let bytes_read = entry.read(&mut buffer).map_err(ArchiveError::Io)?;
        if bytes_read == 0 {
            break;
        }
        out.write_all(&buffer[..bytes_read])
            .map_err(|err| ArchiveError::Item {
                path: destpath.to_path_buf(),
                source: err,
            })?;
    }
    Ok(())
}

/// Applies the stored permission bits when the entry carries any.
///
/// Failures are reported, not fatal; an archive made on a filesystem
/// without permission support stores zeroes and is left alone.
fn apply_permissions(destpath: &Path, attrs: u64, trace: &mut dyn TraceSink) {
    let mode = u32::try_from(attrs >> 16).unwrap_or(0);
    if mode == 0 {
        return;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let host = platform::host_path(destpath);
        if fs::set_permissions(&host, fs::Permissions::from_mode(mode)).is_err() {
            trace.event(TraceEvent::Warning(TraceWarning::PermissionsNotSet {
                destination: destpath,
            }));
        }
    }
    #[cfg(not(unix))]
    {
        let _ = (destpath, trace);
    }
}

/// Restores a file's modtime, reporting failure without aborting.
fn restore_file_mtime(destpath: &Path, mtime_secs: Option<i64>, trace: &mut dyn TraceSink) {
    if let Some(secs) = mtime_secs
        && mtime::restore_mtime(destpath, secs).is_err()
    {
        trace.event(TraceEvent::Warning(TraceWarning::ModTimeNotSet {
            destination: destpath,
        }));
    }
}
