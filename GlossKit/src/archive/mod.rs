//! Language archives
//!
//! An archive is one language's drop of localized files: a directory, a
//! `.zip`, or a `.dmg` disk image. [`MountedArchive`] turns any of them into
//! a readable directory; [`ArchiveReader`] walks that directory and yields
//! one [`ArchiveEntry`] per localization file.
//!
//! # Example
//!
//! ```no_run
//! use glosskit::archive::MountedArchive;
//!
//! let mounted = MountedArchive::open("French.zip")?;
//! let reader = mounted.reader()?;
//! println!("language: {}", reader.detect_language());
//! for entry in reader.entries() {
//!     let parsed = entry.parse()?;
//!     println!("{} -> {} files", entry.path, parsed.files.len());
//! }
//! # Ok::<(), glosskit::Error>(())
//! ```

mod mount;
mod reader;

pub use mount::MountedArchive;
pub use reader::{ArchiveReader, Entries};

use std::path::PathBuf;

use crate::error::Result;
use crate::formats::{Diagnostic, FileFormat, LocalizedFile, lg, strings};

/// A localization file found in an archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Project the file is classified under
    pub project: String,
    /// Normalized archive-relative path (`/` separated, `.lproj` removed)
    pub path: String,
    /// Locale tag of the enclosing `.lproj` directory, if any
    pub locale: Option<String>,
    pub format: FileFormat,
    /// Raw file content
    pub bytes: Vec<u8>,
    /// Location on disk
    pub source: PathBuf,
}

/// The localized files contained in one archive entry.
#[derive(Debug, Clone, Default)]
pub struct ParsedEntry {
    /// Language the entry declares (`.lproj` tag or glossary `loc`)
    pub language: Option<String>,
    pub files: Vec<LocalizedFile>,
    /// Problems that skipped whole files inside the entry
    pub diagnostics: Vec<Diagnostic>,
}

impl ArchiveEntry {
    /// Parse the entry's bytes into localized files.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the content cannot be decoded, or
    /// [`Error::Xml`] for a glossary that is not well-formed XML. Either way
    /// only this entry is lost.
    ///
    /// [`Error::Encoding`]: crate::Error::Encoding
    /// [`Error::Xml`]: crate::Error::Xml
    pub fn parse(&self) -> Result<ParsedEntry> {
        match self.format {
            FileFormat::Strings => {
                let file = strings::parse_strings_bytes(&self.bytes, &self.project, &self.path)?;
                Ok(ParsedEntry {
                    language: self.locale.clone(),
                    files: vec![file],
                    diagnostics: Vec::new(),
                })
            }
            FileFormat::Glossary => {
                let glossary = lg::parse_glossary(&self.bytes, &self.project, &self.path)?;
                Ok(ParsedEntry {
                    language: glossary.language,
                    files: glossary.files,
                    diagnostics: glossary.diagnostics,
                })
            }
        }
    }
}
