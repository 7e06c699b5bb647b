//! Cruft name matching.
//!
//! Decides whether a bare entry name is OS bookkeeping noise that should be
//! left out of an archive. Matching runs against two ordered pattern lists:
//! a name is cruft iff it matches some `skip` pattern and no `keep` pattern.
//! Matching is always case-sensitive, independent of the host filesystem,
//! so the same rule set produces the same archive everywhere.

use glob::Pattern;

use crate::ArchiveError;
use crate::Result;

/// Skip patterns of [`CruftRules::standard`].
pub const STANDARD_SKIP: &[&str] = &[
    ".*",
    "[dD]esktop.ini",
    "Thumbs.db",
    "~*",
    "$*",
    "*.py[co]",
];

/// Keep patterns of [`CruftRules::standard`].
pub const STANDARD_KEEP: &[&str] = &[".htaccess"];

/// A compiled skip/keep rule set.
///
/// Patterns use the shell glob family: `*`, `?`, `[seq]`, and `[!seq]`.
/// They are matched against bare entry names (a `file_name`, never a path),
/// so separators have no special meaning here.
///
/// The default rule set is empty and matches nothing; cruft filtering is
/// strictly opt-in.
///
/// # Examples
///
/// ```
/// use ziptree_core::CruftRules;
///
/// let rules = CruftRules::new(&[".*"], &[".htaccess"])?;
/// assert!(rules.is_cruft(".DS_Store"));
/// assert!(!rules.is_cruft(".htaccess"));
/// assert!(!rules.is_cruft("notes.txt"));
/// # Ok::<(), ziptree_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CruftRules {
    skip: Vec<Pattern>,
    keep: Vec<Pattern>,
}

impl CruftRules {
    /// Compiles a rule set from skip and keep pattern lists.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Pattern`] if any pattern is malformed.
    pub fn new<S: AsRef<str>>(skip: &[S], keep: &[S]) -> Result<Self> {
        Ok(Self {
            skip: compile(skip)?,
            keep: compile(keep)?,
        })
    }

    /// Returns the stock rule set: hidden files, Windows and macOS desktop
    /// metadata, editor backups, and Python bytecode are skipped, while
    /// `.htaccess` is kept despite its leading dot.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(STANDARD_SKIP, STANDARD_KEEP).unwrap_or_default()
    }

    /// Returns `true` iff `name` matches a skip pattern and no keep pattern.
    ///
    /// `name` must be a bare entry name; callers strip directory components
    /// before matching.
    #[must_use]
    pub fn is_cruft(&self, name: &str) -> bool {
        self.skip.iter().any(|p| p.matches(name)) && !self.keep.iter().any(|p| p.matches(name))
    }

    /// Returns `true` when the rule set contains no patterns at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skip.is_empty() && self.keep.is_empty()
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p.as_ref()).map_err(|source| ArchiveError::Pattern {
                pattern: p.as_ref().to_string(),
                source,
            })
        })
        .collect()
}
