//! Conversion options
//!
//! Options can be built in code or loaded from a TOML file:
//!
//! ```toml
//! database = "localizations.sqlite"
//! project_conflict = "fail"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

fn default_database() -> PathBuf {
    PathBuf::from("ios.sqlite")
}

/// What to do when a path reappears under a different project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Keep the first-seen project and emit a diagnostic
    #[default]
    KeepFirst,
    /// Abort the archive
    Fail,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepFirst => f.write_str("keep-first"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

/// Options for a conversion run.
///
/// # Example
///
/// ```
/// use glossdb::options::{ConflictPolicy, ConvertOptions};
///
/// let options = ConvertOptions::new()
///     .with_database("strings.sqlite")
///     .with_project_conflict(ConflictPolicy::Fail);
/// assert_eq!(options.database.to_str(), Some("strings.sqlite"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertOptions {
    /// Destination database file
    /// Default: `ios.sqlite`
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Policy for a path claimed by two projects
    /// Default: keep the first project
    #[serde(default)]
    pub project_conflict: ConflictPolicy,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            database: default_database(),
            project_conflict: ConflictPolicy::default(),
        }
    }
}

impl ConvertOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from TOML text. Missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Set the destination database.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<PathBuf>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the project conflict policy.
    #[must_use]
    pub fn with_project_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.project_conflict = policy;
        self
    }
}
