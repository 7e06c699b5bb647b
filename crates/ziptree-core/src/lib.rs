//! Tree-faithful ZIP archiving: symlinks, permissions, and UTC modtimes.
//!
//! `ziptree-core` creates and extracts ZIP archives while keeping the
//! parts of a file tree that most tools drop. Symbolic links are stored
//! and recreated as links instead of being copied or skipped, Unix
//! permissions ride along with every item, and modtimes are recorded in
//! UTC so a zip-then-unzip round trip is immune to DST rollovers and
//! timezone changes. Extraction never writes outside its destination
//! directory, no matter what entry names an archive holds.
//!
//! # Examples
//!
//! ```no_run
//! use ziptree_core::CreateOptions;
//! use ziptree_core::ExtractOptions;
//! use ziptree_core::NullTrace;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let created = ziptree_core::create_archive(
//!     "backup.zip",
//!     &["photos", "notes.txt"],
//!     &CreateOptions::default(),
//!     &mut NullTrace,
//! )?;
//! println!("Archived {} items", created.total_items());
//!
//! let restored = ziptree_core::extract_archive(
//!     "backup.zip",
//!     "restored",
//!     &ExtractOptions::default(),
//!     &mut NullTrace,
//! )?;
//! println!("Restored {} items", restored.total_items());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod cruft;
pub mod error;
pub mod link;
pub mod mtime;
pub mod options;
pub mod paths;
pub mod platform;
pub mod stats;
pub mod test_utils;
pub mod trace;

mod create;
mod extract;

// Re-export main API types
pub use api::create_archive;
pub use api::extract_archive;
pub use cruft::CruftRules;
pub use error::ArchiveError;
pub use error::Result;
pub use options::CreateOptions;
pub use options::ExtractOptions;
pub use stats::CreateStats;
pub use stats::ExtractStats;
pub use trace::NullTrace;
pub use trace::TraceEvent;
pub use trace::TraceSink;
pub use trace::TraceWarning;
