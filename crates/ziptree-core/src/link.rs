//! Symlink entries: writing links into archives and materializing them out.
//!
//! A link is stored as a regular entry whose data is the target text, with
//! the symlink type nibble in the upper external attributes. Extraction
//! recreates the link itself; when the platform refuses, a stub file
//! holding the target text is left in its place so the rest of the run
//! continues.

use std::fs;
use std::io::Seek;
use std::io::Write;
use std::path::MAIN_SEPARATOR;
use std::path::Path;
use std::path::PathBuf;

use zip::CompressionMethod;
use zip::write::FullFileOptions;
use zip::write::ZipWriter;

use crate::error::ArchiveError;
use crate::error::Result;
use crate::mtime;
use crate::options::ExtractOptions;
use crate::platform;
use crate::trace::TraceEvent;
use crate::trace::TraceSink;
use crate::trace::TraceWarning;

/// Upper-nibble type code marking an entry as a symlink, as in `st_mode`.
pub const SYMLINK_TYPE_NIBBLE: u64 = 0xA;

/// DOS directory bit, set on links whose target is a directory so
/// extraction on Windows can pick the directory link flavor up front.
pub const DIRECTORY_LINK_FLAG: u64 = 0x10;

/// Stored target text for links whose real target could not be read.
pub const LINK_NOT_SUPPORTED: &str = "symlink-not-supported";

/// Materialized target text for stored targets that were not valid UTF-8.
pub const LINK_NOT_DECODABLE: &str = "symlink-not-decodable";

/// Returns `true` when external attributes carry the symlink type code.
#[must_use]
pub const fn is_symlink_entry(attrs: u64) -> bool {
    (attrs >> 28) & 0xF == SYMLINK_TYPE_NIBBLE
}

/// Returns `true` when external attributes flag a directory link.
#[must_use]
pub const fn is_directory_link(attrs: u64) -> bool {
    attrs & DIRECTORY_LINK_FLAG != 0
}

/// What a stored symlink became on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A real symlink was created.
    Link,
    /// A stub file holding the target text was created instead.
    Stub,
    /// Neither the link nor a stub could be created.
    Failed,
}

/// Writes one symlink entry, preserving its own (not its target's) metadata.
///
/// A link whose target cannot be read is still recorded, with sentinel
/// target text, so one bad link does not abort the run; the substitution
/// is reported through `trace`.
///
/// # Errors
///
/// Returns an error when the link itself cannot be inspected or the entry
/// cannot be written.
pub fn write_symlink_entry<W: Write + Seek>(
    writer: &mut ZipWriter<W>,
    source: &Path,
    archive_path: &str,
    trace: &mut dyn TraceSink,
) -> Result<()> {
    let host = platform::host_path(source);

    let target = match fs::read_link(&host) {
        Ok(target) => match target.into_os_string().into_string() {
            Ok(text) => text,
            Err(raw) => {
                trace.event(TraceEvent::Warning(TraceWarning::LinkTargetNotText {
                    archive_path,
                }));
                raw.to_string_lossy().into_owned()
            }
        },
        Err(_) => {
            trace.event(TraceEvent::Warning(TraceWarning::LinkTargetUnreadable {
                source,
            }));
            LINK_NOT_SUPPORTED.to_string()
        }
    };

    let meta = fs::symlink_metadata(&host).map_err(|err| ArchiveError::Item {
        path: source.to_path_buf(),
        source: err,
    })?;
    let modified = meta.modified().map_err(|err| ArchiveError::Item {
        path: source.to_path_buf(),
        source: err,
    })?;
    let mtime_secs = mtime::epoch_seconds(modified);

    let mut options = FullFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
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

    writer.add_symlink(archive_path, target.as_str(), options)?;
    Ok(())
}

/// Recreates a stored symlink at `destination`.
///
/// Target text that does not decode as UTF-8 is replaced by a sentinel so
/// the entry still materializes. Separators in the target are rewritten
/// for the host unless disabled in `options`. An item already present at
/// the destination is replaced. When the platform refuses to create the
/// link, a stub file holding the target text is written instead; each
/// degradation is reported through `trace`.
///
/// # Errors
///
/// Returns an error when the destination's parent directories cannot be
/// created. Link and stub creation failures are not errors; they report
/// through `trace` and show in the returned outcome.
pub fn materialize_symlink(
    payload: &[u8],
    archive_path: &str,
    attrs: u64,
    destination: &Path,
    options: &ExtractOptions,
    trace: &mut dyn TraceSink,
) -> Result<LinkOutcome> {
    let mut target = match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => {
            trace.event(TraceEvent::Warning(TraceWarning::LinkTargetNotText {
                archive_path,
            }));
            LINK_NOT_DECODABLE.to_string()
        }
    };

    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        let host_parent = platform::host_path(parent);
        if !host_parent.exists() {
            fs::create_dir_all(&host_parent).map_err(|err| ArchiveError::Item {
                path: parent.to_path_buf(),
                source: err,
            })?;
        }
    }

    if options.fix_link_separators {
        target = target
            .replace('/', &MAIN_SEPARATOR.to_string())
            .replace('\\', &MAIN_SEPARATOR.to_string());
    }

    let host_dest = platform::host_path(destination);
    if fs::symlink_metadata(&host_dest).is_ok() {
        let _ = fs::remove_file(&host_dest);
    }

    let dir_hint = is_directory_link(attrs) || link_points_at_dir(destination, &target);
    if platform::create_symlink(Path::new(&target), &host_dest, dir_hint).is_ok() {
        return Ok(LinkOutcome::Link);
    }

    trace.event(TraceEvent::Warning(TraceWarning::LinkStubbed { destination }));
    if fs::write(&host_dest, target.as_bytes()).is_ok() {
        Ok(LinkOutcome::Stub)
    } else {
        trace.event(TraceEvent::Warning(TraceWarning::StubWriteFailed {
            destination,
        }));
        Ok(LinkOutcome::Failed)
    }
}

/// Resolves the stored target relative to the link's parent and reports
/// whether it names an existing directory. Dangling targets report `false`.
fn link_points_at_dir(destination: &Path, target: &str) -> bool {
    let target_path = Path::new(target);
    let probe: PathBuf = if target_path.is_absolute() {
        target_path.to_path_buf()
    } else {
        match destination.parent() {
            Some(parent) => parent.join(target_path),
            None => target_path.to_path_buf(),
        }
    };
    fs::metadata(platform::host_path(&probe)).is_ok_and(|meta| meta.is_dir())
}
