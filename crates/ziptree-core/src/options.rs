//! Configuration for archive creation and extraction.

use crate::cruft::CruftRules;

/// Configuration for archive creation.
///
/// Controls directory storage, name filtering, symlink handling, and where
/// items land inside the archive.
///
/// # Examples
///
/// ```
/// use ziptree_core::CreateOptions;
/// use ziptree_core::CruftRules;
///
/// // Defaults: store empty directories, keep symlinks as links, no filter
/// let options = CreateOptions::default();
///
/// // Clean a tree of platform droppings while archiving
/// let cleaning = CreateOptions::default().with_cruft(Some(CruftRules::standard()));
/// ```
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Store directory entries in the archive, including empty ones.
    ///
    /// When disabled, directories are still traversed but no directory
    /// entries are written; empty directories then vanish on extraction.
    ///
    /// Default: `true`.
    pub store_empty_dirs: bool,

    /// Name filter applied to every item below the top level.
    ///
    /// Matching items are skipped (with their entire subtree, for
    /// directories) and counted, not treated as errors. `None` archives
    /// everything.
    ///
    /// Default: `None`.
    pub cruft: Option<CruftRules>,

    /// Archive the targets of symlinks instead of the links themselves.
    ///
    /// When enabled, a link to a file is stored as a copy of that file and
    /// a link to a directory is traversed as if it were that directory,
    /// except where following it would revisit a directory already on the
    /// traversal path; such cycle-closing links are stored as links.
    ///
    /// Default: `false` (store symlinks as symlinks).
    pub follow_links: bool,

    /// Replacement for the source path prefix of archived names.
    ///
    /// Uses `/` separators. `Some(".")` or `Some("")` flattens every item
    /// to its bare name at the archive root; any other value replaces the
    /// directory prefix of each source path. `None` stores items under
    /// their given relative paths.
    ///
    /// Default: `None`.
    pub archive_root: Option<String>,
}

impl CreateOptions {
    /// Creates a `CreateOptions` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether directory entries are stored.
    #[must_use]
    pub fn with_store_empty_dirs(mut self, store: bool) -> Self {
        self.store_empty_dirs = store;
        self
    }

    /// Sets the cruft filter.
    #[must_use]
    pub fn with_cruft(mut self, rules: Option<CruftRules>) -> Self {
        self.cruft = rules;
        self
    }

    /// Sets whether symlink targets are archived in place of the links.
    #[must_use]
    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Sets the archive root override.
    #[must_use]
    pub fn with_archive_root(mut self, root: Option<String>) -> Self {
        self.archive_root = root;
        self
    }
}

/// Configuration for archive extraction.
///
/// # Examples
///
/// ```
/// use ziptree_core::ExtractOptions;
///
/// let options = ExtractOptions::default().with_propagate_permissions(true);
/// assert!(options.fix_link_separators);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Rewrite path separators inside extracted symlink targets to the
    /// host's convention.
    ///
    /// Disable only when extracting archives that must keep foreign
    /// separators verbatim, such as links whose text is consumed by
    /// another system.
    ///
    /// Default: `true`.
    pub fix_link_separators: bool,

    /// Apply stored POSIX permission bits to extracted items.
    ///
    /// Entries that carry no permission bits are left with the
    /// platform-default mode either way.
    ///
    /// Default: `false`.
    pub propagate_permissions: bool,
}

impl Default for CreateOptions {
    /// Creates a `CreateOptions` with default settings.
    ///
    /// Default values:
    /// - `store_empty_dirs`: `true`
    /// - `cruft`: `None`
    /// - `follow_links`: `false`
    /// - `archive_root`: `None`
    fn default() -> Self {
        Self {
            store_empty_dirs: true,
            cruft: None,
            follow_links: false,
            archive_root: None,
        }
    }
}

impl Default for ExtractOptions {
    /// Creates an `ExtractOptions` with default settings.
    ///
    /// Default values:
    /// - `fix_link_separators`: `true`
    /// - `propagate_permissions`: `false`
    fn default() -> Self {
        Self {
            fix_link_separators: true,
            propagate_permissions: false,
        }
    }
}

impl ExtractOptions {
    /// Creates an `ExtractOptions` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether symlink target separators are rewritten for the host.
    #[must_use]
    pub fn with_fix_link_separators(mut self, fix: bool) -> Self {
        self.fix_link_separators = fix;
        self
    }

    /// Sets whether stored permissions are applied.
    #[must_use]
    pub fn with_propagate_permissions(mut self, propagate: bool) -> Self {
        self.propagate_permissions = propagate;
        self
    }
}
