//! Counter aggregates returned by archive operations.

use std::fmt;
use std::ops::Add;
use std::ops::AddAssign;

/// Counters accumulated while creating an archive.
///
/// Each counter is independent; the aggregate supports pairwise addition so
/// callers can merge results from several create calls.
///
/// # Examples
///
/// ```
/// use ziptree_core::CreateStats;
///
/// let mut total = CreateStats::default();
/// let mut batch = CreateStats::default();
/// batch.files = 3;
/// batch.links = 1;
/// total += batch;
/// assert_eq!(total.files, 3);
/// assert_eq!(total.total_items(), 4);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateStats {
    /// Regular files written (including followed file links).
    pub files: usize,

    /// Directory entries written.
    pub folders: usize,

    /// Symlink entries written.
    pub links: usize,

    /// Items skipped because they are neither file, directory, nor symlink.
    pub unsupported: usize,

    /// Items skipped by the cruft rules.
    pub cruft_skipped: usize,
}

impl CreateStats {
    /// Creates a zeroed aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries actually written to the archive.
    #[must_use]
    pub const fn total_items(&self) -> usize {
        self.files + self.folders + self.links
    }
}

impl AddAssign for CreateStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.folders += other.folders;
        self.links += other.links;
        self.unsupported += other.unsupported;
        self.cruft_skipped += other.cruft_skipped;
    }
}

impl Add for CreateStats {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl fmt::Display for CreateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "files={}, folders={}, links={}, unsupported={}, cruft_skipped={}",
            self.files, self.folders, self.links, self.unsupported, self.cruft_skipped
        )
    }
}

/// Counters accumulated while extracting an archive.
///
/// Counted against what was actually materialized on disk, so a symlink
/// entry that degraded to a stub file increments `files`, not `links`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Regular files written (including symlink stub files).
    pub files: usize,

    /// Directories created or re-stamped.
    pub folders: usize,

    /// Symlinks recreated.
    pub links: usize,

    /// Entries that materialized as nothing usable.
    pub unsupported: usize,
}

impl ExtractStats {
    /// Creates a zeroed aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of items materialized on disk.
    #[must_use]
    pub const fn total_items(&self) -> usize {
        self.files + self.folders + self.links
    }
}

impl AddAssign for ExtractStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.folders += other.folders;
        self.links += other.links;
        self.unsupported += other.unsupported;
    }
}

impl Add for ExtractStats {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl fmt::Display for ExtractStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "files={}, folders={}, links={}, unsupported={}",
            self.files, self.folders, self.links, self.unsupported
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_stats_default() {
        let stats = CreateStats::default();
        assert_eq!(stats.files, 0);
        assert_eq!(stats.folders, 0);
        assert_eq!(stats.links, 0);
        assert_eq!(stats.unsupported, 0);
        assert_eq!(stats.cruft_skipped, 0);
        assert_eq!(stats.total_items(), 0);
    }

    #[test]
    fn test_create_stats_merge() {
        let mut a = CreateStats::new();
        a.files = 1;
        a.folders = 2;
        a.links = 3;

        let mut b = CreateStats::new();
        b.folders = 10;
        b.unsupported = 20;
        b.cruft_skipped = 1;

        a += b;
        assert_eq!(a.files, 1);
        assert_eq!(a.folders, 12);
        assert_eq!(a.links, 3);
        assert_eq!(a.unsupported, 20);
        assert_eq!(a.cruft_skipped, 1);
    }

    #[test]
    fn test_create_stats_add_is_pairwise() {
        let mut a = CreateStats::new();
        a.files = 2;
        let mut b = CreateStats::new();
        b.files = 3;
        b.links = 1;

        let c = a + b;
        assert_eq!(c.files, 5);
        assert_eq!(c.links, 1);
        assert_eq!(c.total_items(), 6);
    }

    #[test]
    fn test_create_stats_display() {
        let mut stats = CreateStats::new();
        stats.files = 1;
        stats.folders = 2;
        stats.links = 3;
        assert_eq!(
            stats.to_string(),
            "files=1, folders=2, links=3, unsupported=0, cruft_skipped=0"
        );
    }

    #[test]
    fn test_extract_stats_merge_and_display() {
        let mut a = ExtractStats::new();
        a.files = 4;
        a.folders = 1;

        let mut b = ExtractStats::new();
        b.links = 2;

        let c = a + b;
        assert_eq!(c.total_items(), 7);
        assert_eq!(c.to_string(), "files=4, folders=1, links=2, unsupported=0");
    }
}
