//! Archive name derivation and destination path containment.
//!
//! Names stored in an archive always use `/` separators and never carry a
//! drive prefix or leading separator. On the way in, source paths are
//! normalized lexically; interior `..` components collapse but leading ones
//! survive, so an archive built from `../data` records that intent. On the
//! way out, names from the archive are untrusted: every `..` and drive
//! prefix is dropped before joining under the destination, so no entry can
//! place an item outside it.

use std::path::Path;
use std::path::PathBuf;

/// Separator set for source paths on this host. Windows accepts both.
fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

/// Strips a leading `X:` drive prefix.
fn strip_drive(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        &s[2..]
    } else {
        s
    }
}

/// Splits a path string into directory head and final item, with trailing
/// separators trimmed from the head unless the head is only separators.
fn split_head(s: &str) -> (&str, &str) {
    match s.rfind(is_separator) {
        None => ("", s),
        Some(i) => {
            let (head, tail) = (&s[..=i], &s[i + 1..]);
            let trimmed = head.trim_end_matches(is_separator);
            if trimmed.is_empty() {
                (head, tail)
            } else {
                (trimmed, tail)
            }
        }
    }
}

/// Returns the final item name of a path string, empty for paths that end
/// in a separator.
pub(crate) fn base_name(path: &str) -> &str {
    split_head(path).1
}

/// Replaces the directory portion of a top-level source path with the
/// configured archive root.
///
/// `None` leaves the path alone. A root of `"."` or `""` drops the
/// directory portion, flattening the item to its bare name. Otherwise the
/// head of `source` is replaced by the root (prepended, when the source has
/// no head). Trailing separators on the root are ignored, and a source with
/// a trailing separator stores the item at the root path itself rather than
/// beneath it.
#[must_use]
pub fn apply_archive_root(source: &str, archive_root: Option<&str>) -> String {
    let Some(root) = archive_root else {
        return source.to_string();
    };
    let root = root.trim_end_matches(is_separator);
    let (head, tail) = split_head(source);

    if head.is_empty() {
        if root.is_empty() {
            source.to_string()
        } else {
            format!("{root}/{source}")
        }
    } else if root.is_empty() || root == "." {
        tail.to_string()
    } else {
        source.replacen(head, root, 1)
    }
}

/// Normalizes a source path into its stored archive name.
///
/// Drops any drive prefix (on Windows hosts) and leading separators,
/// collapses `.` and empty components, resolves interior `..` components
/// lexically, and joins with `/`. Leading `..` components of a relative
/// path are kept. The result is empty when nothing remains, as for `"."`.
///
/// # Examples
///
/// ```
/// use ziptree_core::paths::normalize_archive_name;
///
/// assert_eq!(normalize_archive_name("./docs//readme.txt"), "docs/readme.txt");
/// assert_eq!(normalize_archive_name("/var/tmp/x"), "var/tmp/x");
/// assert_eq!(normalize_archive_name("../shared"), "../shared");
/// assert_eq!(normalize_archive_name("."), "");
/// ```
#[must_use]
pub fn normalize_archive_name(path: &str) -> String {
    let path = if cfg!(windows) {
        strip_drive(path)
    } else {
        path
    };
    let absolute = path.chars().next().is_some_and(is_separator);

    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(is_separator) {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            name => parts.push(name),
        }
    }
    parts.join("/")
}

/// Derives the stored archive name for a top-level source path, with the
/// root override applied first.
#[must_use]
pub fn archive_seed(source: &Path, archive_root: Option<&str>) -> String {
    let raw = source.to_string_lossy();
    normalize_archive_name(&apply_archive_root(&raw, archive_root))
}

/// Appends one child name to an archive path.
#[must_use]
pub fn extend_archive_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

/// Reduces an entry name from an archive to a safe relative path.
///
/// Both separator conventions are honored regardless of host, a leading
/// drive prefix is removed, and every empty, `.`, and `..` component is
/// dropped outright. The result is empty when nothing remains.
///
/// # Examples
///
/// ```
/// use ziptree_core::paths::sanitize_entry_name;
///
/// assert_eq!(sanitize_entry_name("../../etc/passwd"), "etc/passwd");
/// assert_eq!(sanitize_entry_name(r"C:\temp\note.txt"), "temp/note.txt");
/// assert_eq!(sanitize_entry_name("docs/guide.md"), "docs/guide.md");
/// ```
#[must_use]
pub fn sanitize_entry_name(name: &str) -> String {
    let unified = name.replace('\\', "/");
    let trimmed = strip_drive(&unified);
    let parts: Vec<&str> = trimmed
        .split('/')
        .filter(|part| !matches!(*part, "" | "." | ".."))
        .collect();
    parts.join("/")
}

/// Resolves where an entry lands under the destination directory.
///
/// The name is sanitized first, so the result is always at or below
/// `destination`; an entry whose name sanitizes to nothing resolves to the
/// destination itself.
#[must_use]
pub fn entry_destination(destination: &Path, name: &str) -> PathBuf {
    let safe = sanitize_entry_name(name);
    let mut out = destination.to_path_buf();
    for part in safe.split('/').filter(|part| !part.is_empty()) {
        out.push(part);
    }
    out
}
