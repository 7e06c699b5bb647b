//! Platform capability queries and host filesystem adapters.
//!
//! Windows and POSIX differ on symlink creation, link metadata, and path
//! length limits. Those differences are concentrated here as capability
//! functions and small adapters, so the traversal and extraction code can
//! query once per operation instead of branching inline.

use std::io;
use std::path::Path;
use std::path::PathBuf;

/// Identity key of a filesystem object.
///
/// Two paths with equal keys refer to the same underlying object; the pair
/// of device and inode numbers is stable for the life of the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId {
    dev: u64,
    ino: u64,
}

/// Returns `true` when the platform can materialize real symlinks.
///
/// A `true` answer does not guarantee each individual creation succeeds
/// (Windows restricts symlink creation by privilege and filesystem);
/// failures still degrade to stub files per item.
#[must_use]
pub const fn can_create_symlinks() -> bool {
    cfg!(any(unix, windows))
}

/// Returns `true` when a symlink's own modification time can be set.
#[must_use]
pub const fn can_set_link_mtime() -> bool {
    cfg!(any(unix, windows))
}

/// Returns `true` when a symlink's own permission bits can be set.
///
/// No current target offers a safe, portable primitive for this, so link
/// permission application is skipped everywhere. The bits are still stored
/// and round-trip through the archive.
#[must_use]
pub const fn can_set_link_permissions() -> bool {
    false
}

/// Returns `true` when [`file_identity`] yields stable keys.
///
/// Without identity support, directory-link cycle detection is skipped and
/// a genuinely cyclic tree can recurse until the filesystem runs out of
/// path; this is a documented limitation, not handled behavior.
#[must_use]
pub const fn supports_file_identity() -> bool {
    cfg!(unix)
}

/// Returns the identity key of the object `path` resolves to, following
/// links, or `None` where the platform has no stable identity primitive.
///
/// # Errors
///
/// Propagates the underlying stat failure.
pub fn file_identity(path: &Path) -> io::Result<Option<FileId>> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;

        let meta = std::fs::metadata(host_path(path))?;
        Ok(Some(FileId {
            dev: meta.dev(),
            ino: meta.ino(),
        }))
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(None)
    }
}

/// Creates a symlink at `dest` pointing at `target`.
///
/// `dir_hint` selects the directory flavor on Windows, where the kind must
/// be declared up front because the target may not exist yet; other
/// platforms ignore it.
///
/// # Errors
///
/// Propagates the underlying creation failure, or `Unsupported` on
/// platforms without symlinks.
pub fn create_symlink(target: &Path, dest: &Path, dir_hint: bool) -> io::Result<()> {
    #[cfg(unix)]
    {
        let _ = dir_hint;
        std::os::unix::fs::symlink(target, dest)
    }
    #[cfg(windows)]
    {
        if dir_hint {
            std::os::windows::fs::symlink_dir(target, dest)
        } else {
            std::os::windows::fs::symlink_file(target, dest)
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (target, dest, dir_hint);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "symlinks are not supported on this platform",
        ))
    }
}

/// Adapts a caller-visible path for host filesystem calls.
///
/// On Windows the result is absolute and `\\?\`-prefixed (idempotently), so
/// joined-path lengths past the legacy limit keep working; elsewhere the
/// path is returned unchanged. Archive-internal paths are always derived
/// from the unadapted form, never from this one.
#[must_use]
pub fn host_path(path: &Path) -> PathBuf {
    #[cfg(windows)]
    {
        long_windows_path(path)
    }
    #[cfg(not(windows))]
    {
        path.to_path_buf()
    }
}

#[cfg(windows)]
fn long_windows_path(path: &Path) -> PathBuf {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStrExt;
    use std::os::windows::ffi::OsStringExt;
    use std::path::Component;
    use std::path::Prefix;

    let already_verbatim = matches!(
        path.components().next(),
        Some(Component::Prefix(p)) if p.kind().is_verbatim()
    );
    if already_verbatim {
        return path.to_path_buf();
    }

    let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let is_unc = matches!(
        abs.components().next(),
        Some(Component::Prefix(p)) if matches!(p.kind(), Prefix::UNC(..))
    );

    if is_unc {
        // \\server\share -> \\?\UNC\server\share
        let wide: Vec<u16> = abs.as_os_str().encode_wide().collect();
        let mut out: Vec<u16> = OsString::from(r"\\?\UNC").encode_wide().collect();
        out.extend(&wide[1..]);
        PathBuf::from(OsString::from_wide(&out))
    } else {
        let mut out = OsString::from(r"\\?\");
        out.push(abs.as_os_str());
        PathBuf::from(out)
    }
}
