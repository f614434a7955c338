//! # GlossKit
//!
//! A pure-Rust library for reading localization archives: the per-language
//! drops of translated resources produced for Apple platform apps.
//!
//! ## Supported Formats
//!
//! - **`.strings`** - `"key" = "value";` resource files, UTF-8 or UTF-16
//! - **`.lg`** - XML localization glossaries with base and translated text
//! - **Archives** - plain directories, `.zip` files and `.dmg` disk images
//!
//! ## Quick Start
//!
//! ### Parsing a Resource File
//!
//! ```
//! use glosskit::formats::strings::parse_strings_str;
//!
//! let file = parse_strings_str("/* Button */\n\"OK\" = \"Valider\";", "App", "App/Foo.strings");
//! assert_eq!(file.records[0].value.as_deref(), Some("Valider"));
//! assert_eq!(file.records[0].description.as_deref(), Some("Button"));
//! ```
//!
//! ### Walking an Archive
//!
//! ```no_run
//! use glosskit::prelude::*;
//!
//! let mounted = MountedArchive::open("French.dmg")?;
//! let reader = mounted.reader()?;
//! let language = LanguageCode::parse(&reader.detect_language())?;
//! for entry in reader.entries() {
//!     for file in entry.parse()?.files {
//!         println!("[{language}] {}: {} records", file.path, file.records.len());
//!     }
//! }
//! # Ok::<(), glosskit::Error>(())
//! ```

pub mod archive;
pub mod error;
pub mod formats;
pub mod locale;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::archive::{ArchiveEntry, ArchiveReader, Entries, MountedArchive, ParsedEntry};
    pub use crate::formats::{Diagnostic, DiagnosticKind, FileFormat, LocalizedFile, Record};
    pub use crate::formats::lg::{Glossary, parse_glossary};
    pub use crate::formats::strings::{parse_strings, parse_strings_bytes, parse_strings_str};
    pub use crate::locale::{BASELINE, LanguageCode, format_language};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
