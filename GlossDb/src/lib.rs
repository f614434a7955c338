//! # glossdb
//!
//! Merges per-language localization archives into a single SQLite database
//! for cross-language lookup of the same UI string by file and key.
//!
//! Every archive holds one language's translations. Archives are merged in
//! order: the first archive to contain a (file, position) creates its row
//! with the description and English baseline, later archives add their
//! language's column.
//!
//! ## Database Layout
//!
//! ```text
//! Files(id, project, path UNIQUE)
//! Localizations(file_id, position, description, en, <language>...)
//!     UNIQUE(file_id, position)
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use glossdb::prelude::*;
//!
//! let options = ConvertOptions::new().with_database("ios.sqlite");
//! let summary = glossdb::merge::run(&options, &["English.dmg", "French.zip", "de/"])?;
//! for report in &summary.reports {
//!     println!("{report}");
//! }
//! # Ok::<(), glossdb::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `glossdb` command-line binary (default)

pub mod error;
pub mod merge;
pub mod options;
pub mod registry;
pub mod store;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::merge::{ArchiveReport, MergeEngine, RunSummary};
    pub use crate::options::{ConflictPolicy, ConvertOptions};
    pub use crate::registry::LanguageRegistry;
    pub use crate::store::{LocalizationRow, Store, UpsertOutcome};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
