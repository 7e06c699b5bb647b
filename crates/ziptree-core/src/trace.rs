//! Progress and diagnostic reporting for archive operations.
//!
//! Both public operations thread a caller-supplied [`TraceSink`] through the
//! traversal instead of writing to any global logger. Events carry paths and
//! outcomes, never formatted prose; rendering is the caller's concern.

use std::path::Path;

/// One progress or diagnostic event emitted during create or extract.
///
/// `Adding*` and `Extracted` mark per-item progress. `Skipped*` and
/// `RecursiveLinkCopied` mark policy decisions. [`TraceEvent::Warning`]
/// wraps the recoverable failures of the error taxonomy; the operation has
/// already compensated (sentinel target, stub file, metadata left as-is)
/// by the time the warning is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent<'a> {
    /// A regular file is being written to the archive.
    AddingFile {
        /// Source path on the host filesystem.
        source: &'a Path,
        /// Path recorded in the archive.
        archive_path: &'a str,
    },

    /// A directory entry is being written to the archive.
    AddingFolder {
        /// Source path on the host filesystem.
        source: &'a Path,
        /// Path recorded in the archive.
        archive_path: &'a str,
    },

    /// A symlink entry is being written to the archive.
    AddingLink {
        /// Source path on the host filesystem.
        source: &'a Path,
        /// Path recorded in the archive.
        archive_path: &'a str,
    },

    /// A directory link led back to one of its own ancestors and was
    /// written as a symlink entry instead of being entered.
    RecursiveLinkCopied {
        /// The recursive link's host path.
        source: &'a Path,
    },

    /// An item's bare name matched the cruft rules.
    SkippedCruft {
        /// The skipped item's host path.
        source: &'a Path,
    },

    /// An item is neither file, directory, nor symlink.
    SkippedUnsupported {
        /// The skipped item's host path.
        source: &'a Path,
    },

    /// One stored entry was materialized at the destination.
    Extracted {
        /// Path of the entry inside the archive.
        archive_path: &'a str,
        /// Path the entry was written to.
        destination: &'a Path,
        /// True when the entry was stored as a symlink record.
        link: bool,
    },

    /// A recoverable failure was compensated for.
    Warning(TraceWarning<'a>),
}

/// Recoverable failures reported through [`TraceEvent::Warning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceWarning<'a> {
    /// The link's target text could not be read; the sentinel target was
    /// stored instead.
    LinkTargetUnreadable {
        /// The link's host path.
        source: &'a Path,
    },

    /// The stored target bytes are not UTF-8; the sentinel target was used.
    LinkTargetNotText {
        /// Path of the entry inside the archive.
        archive_path: &'a str,
    },

    /// A real symlink could not be created; a stub file holding the target
    /// text was written instead.
    LinkStubbed {
        /// Destination path of the stub.
        destination: &'a Path,
    },

    /// Neither a symlink nor a stub file could be created.
    StubWriteFailed {
        /// Destination path that could not be written.
        destination: &'a Path,
    },

    /// Stored permission bits could not be applied.
    PermissionsNotSet {
        /// The affected destination path.
        destination: &'a Path,
    },

    /// The stored modification time could not be applied.
    ModTimeNotSet {
        /// The affected destination path.
        destination: &'a Path,
    },
}

/// Receiver for [`TraceEvent`]s.
///
/// Implemented by any `FnMut(TraceEvent)` closure, so ad-hoc sinks need no
/// named type:
///
/// ```
/// use ziptree_core::{TraceEvent, TraceSink};
///
/// let mut skipped = 0usize;
/// let mut sink = |event: TraceEvent<'_>| {
///     if matches!(event, TraceEvent::SkippedCruft { .. }) {
///         skipped += 1;
///     }
/// };
/// sink.event(TraceEvent::SkippedCruft {
///     source: std::path::Path::new(".DS_Store"),
/// });
/// drop(sink);
/// assert_eq!(skipped, 1);
/// ```
pub trait TraceSink {
    /// Delivers one event. Implementations must not panic; the engine calls
    /// this mid-traversal with borrows into its own state.
    fn event(&mut self, event: TraceEvent<'_>);
}

impl<F> TraceSink for F
where
    F: FnMut(TraceEvent<'_>),
{
    fn event(&mut self, event: TraceEvent<'_>) {
        self(event);
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn event(&mut self, _event: TraceEvent<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_trace_ignores_events() {
        let mut sink = NullTrace;
        sink.event(TraceEvent::SkippedUnsupported {
            source: Path::new("a/fifo"),
        });
    }

    #[test]
    fn test_closure_sink_collects() {
        let mut seen = Vec::new();
        let mut sink = |event: TraceEvent<'_>| seen.push(format!("{event:?}"));
        sink.event(TraceEvent::AddingFile {
            source: Path::new("dir/x.txt"),
            archive_path: "dir/x.txt",
        });
        sink.event(TraceEvent::Warning(TraceWarning::ModTimeNotSet {
            destination: Path::new("out/x.txt"),
        }));
        drop(sink);
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("AddingFile"));
        assert!(seen[1].contains("ModTimeNotSet"));
    }

    #[test]
    fn test_events_compare() {
        let a = TraceEvent::SkippedCruft {
            source: Path::new(".DS_Store"),
        };
        let b = TraceEvent::SkippedCruft {
            source: Path::new(".DS_Store"),
        };
        assert_eq!(a, b);
    }
}
