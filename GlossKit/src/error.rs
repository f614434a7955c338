//! Error types for `GlossKit`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `GlossKit` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Archive Errors ====================
    /// The archive root could not be mounted, opened or listed.
    #[error("archive unreadable: {path}: {reason}")]
    ArchiveUnreadable {
        /// The archive (or its mount point).
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A single entry inside an archive could not be read.
    #[error("unreadable archive entry {path}: {source}")]
    UnreadableEntry {
        /// Path of the entry on disk.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Mounting or detaching a disk image failed.
    #[error("mount failed for {path}: {message}")]
    Mount {
        /// The disk image.
        path: PathBuf,
        /// Output of the mount tool, or the spawn error.
        message: String,
    },

    // ==================== Format Errors ====================
    /// The declared encoding cannot decode the file.
    #[error("cannot decode {path} as {encoding}")]
    Encoding {
        /// Archive-relative path of the file.
        path: String,
        /// Name of the declared encoding.
        encoding: &'static str,
    },

    /// A language tag is empty or not a locale identifier.
    #[error("invalid language code: {0:?}")]
    InvalidLanguageCode(String),

    // ==================== Parsing Errors ====================
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    XmlAttr(String),

    /// Zip extraction error.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ==================== File System Errors ====================
    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDir(String),
}

impl Error {
    /// Whether this error means the whole archive has to be skipped.
    #[must_use]
    pub fn is_archive_level(&self) -> bool {
        matches!(
            self,
            Error::ArchiveUnreadable { .. } | Error::Mount { .. } | Error::InvalidLanguageCode(_)
        )
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(err.to_string())
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDir(err.to_string())
    }
}

/// A specialized Result type for `GlossKit` operations.
pub type Result<T> = std::result::Result<T, Error>;
