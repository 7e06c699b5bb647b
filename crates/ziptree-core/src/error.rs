//! Error types for archive creation and extraction.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that abort an archive operation.
///
/// Only fatal conditions surface here: failure to open the archive itself,
/// container-level corruption, content I/O failures, and invalid caller
/// configuration. Per-item recoverable conditions (unreadable link targets,
/// stub fallbacks, permission or modtime set failures) are reported through
/// the operation's [`TraceSink`](crate::TraceSink) instead and never abort
/// the call.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive container reported an error (corrupt directory,
    /// unsupported record, compression failure).
    #[error("archive error: {0}")]
    Container(#[from] zip::result::ZipError),

    /// The archive file itself could not be opened.
    #[error("cannot open archive {path}: {source}")]
    Open {
        /// Path of the archive file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Reading or writing one item's content bytes failed.
    ///
    /// Content bytes are core data; unlike metadata failures this aborts
    /// the whole operation.
    #[error("I/O failure on {path}: {source}")]
    Item {
        /// Host path of the item being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A cruft rule pattern failed to compile.
    #[error("invalid cruft pattern {pattern:?}: {source}")]
    Pattern {
        /// The offending pattern text.
        pattern: String,
        /// Parse error from the glob engine.
        source: glob::PatternError,
    },
}

impl ArchiveError {
    /// Returns the host or archive path this error carries, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::{Path, PathBuf};
    /// use ziptree_core::ArchiveError;
    ///
    /// let err = ArchiveError::Open {
    ///     path: PathBuf::from("missing.zip"),
    ///     source: std::io::Error::from(std::io::ErrorKind::NotFound),
    /// };
    /// assert_eq!(err.path(), Some(Path::new("missing.zip")));
    /// ```
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Open { path, .. } | Self::Item { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Returns `true` if this error stems from caller configuration rather
    /// than the filesystem or the archive.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Pattern { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_display() {
        let err = ArchiveError::Open {
            path: PathBuf::from("out.zip"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let display = err.to_string();
        assert!(display.contains("cannot open archive"));
        assert!(display.contains("out.zip"));
    }

    #[test]
    fn test_item_error_display() {
        let err = ArchiveError::Item {
            path: PathBuf::from("tree/data.bin"),
            source: std::io::Error::from(std::io::ErrorKind::UnexpectedEof),
        };
        let display = err.to_string();
        assert!(display.contains("I/O failure"));
        assert!(display.contains("tree/data.bin"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ArchiveError = io_err.into();
        assert!(matches!(err, ArchiveError::Io(_)));
        assert_eq!(err.path(), None);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_pattern_error() {
        let source = glob::Pattern::new("[").unwrap_err();
        let err = ArchiveError::Pattern {
            pattern: "[".to_string(),
            source,
        };
        assert!(err.is_config());
        assert!(err.to_string().contains("invalid cruft pattern"));
    }

    #[test]
    fn test_path_accessor() {
        let err = ArchiveError::Item {
            path: PathBuf::from("a/b"),
            source: std::io::Error::from(std::io::ErrorKind::Other),
        };
        assert_eq!(err.path(), Some(Path::new("a/b")));
        assert!(!err.is_config());
    }
}
