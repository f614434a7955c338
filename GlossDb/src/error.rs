//! Error types for `GlossDb`

use thiserror::Error;

/// The error type for conversion runs.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== Archive Errors ====================
    /// Archive, format or language error from `GlossKit`.
    #[error(transparent)]
    Kit(#[from] glosskit::Error),

    /// A path already belongs to another project and the policy is `fail`.
    #[error("{path} belongs to project {existing:?}, archive says {incoming:?}")]
    ProjectConflict {
        /// The file path shared by both projects.
        path: String,
        /// Project stored on first sight.
        existing: String,
        /// Project claimed by the current archive.
        incoming: String,
    },

    // ==================== Store Errors ====================
    /// Persistence failure (constraint violation, I/O, corrupt database).
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    // ==================== Configuration Errors ====================
    /// The configuration file is not valid TOML for [`ConvertOptions`].
    ///
    /// [`ConvertOptions`]: crate::options::ConvertOptions
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error aborts the whole run rather than a single archive.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Store(_))
    }
}

/// A specialized Result type for `GlossDb` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors() {
        let store = Error::Store(rusqlite::Error::InvalidQuery);
        assert!(store.is_fatal());

        let conflict = Error::ProjectConflict {
            path: "App/Foo.strings".to_string(),
            existing: "App".to_string(),
            incoming: "Other".to_string(),
        };
        assert!(!conflict.is_fatal());
        assert_eq!(
            conflict.to_string(),
            "App/Foo.strings belongs to project \"App\", archive says \"Other\""
        );

        let language = Error::from(glosskit::Error::InvalidLanguageCode("x".to_string()));
        assert!(!language.is_fatal());
    }
}
