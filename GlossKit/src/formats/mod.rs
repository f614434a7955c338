//! Localization file formats
//!
//! - [`strings`] - `"key" = "value";` resource files (`.strings`)
//! - [`lg`] - XML localization glossaries (`.lg`)
//!
//! Both parsers produce [`LocalizedFile`]s: an archive-relative path, the
//! project it belongs to, and the ordered [`Record`]s found in it. Problems
//! that only affect part of a file are reported as [`Diagnostic`]s instead
//! of errors.

pub mod encoding;
pub mod lg;
pub mod strings;

use std::fmt;
use std::path::Path;

/// Localization file formats recognised inside an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// `.strings` resource file (one file per entry)
    Strings,
    /// `.lg` glossary (many files per entry)
    Glossary,
}

impl FileFormat {
    /// Detect the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "strings" => Some(Self::Strings),
            "lg" => Some(Self::Glossary),
            _ => None,
        }
    }

    /// Get the file extension for this format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Strings => "strings",
            Self::Glossary => "lg",
        }
    }
}

/// One translatable entry of a localized file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Key of the entry within its file
    pub position: String,
    /// Comment attached to the entry, if any
    pub description: Option<String>,
    /// Value in the archive's language; `None` when left untranslated
    pub value: Option<String>,
    /// Baseline value when the format carries it separately (`.lg`)
    pub baseline: Option<String>,
}

impl Record {
    pub fn new(position: impl Into<String>, description: Option<String>, value: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            description,
            value: Some(value.into()),
            baseline: None,
        }
    }

    /// An entry present in the file but carrying no translation.
    pub fn untranslated(position: impl Into<String>, description: Option<String>) -> Self {
        Self {
            position: position.into(),
            description,
            value: None,
            baseline: None,
        }
    }

    #[must_use]
    pub fn with_baseline(mut self, baseline: Option<String>) -> Self {
        self.baseline = baseline;
        self
    }

    /// The value a new row should store as its baseline.
    #[must_use]
    pub fn baseline_or_value(&self) -> &str {
        self.baseline.as_deref().or(self.value.as_deref()).unwrap_or_default()
    }
}

/// A parsed localized file.
#[derive(Debug, Clone, Default)]
pub struct LocalizedFile {
    /// Project the file belongs to
    pub project: String,
    /// Normalized archive-relative path (unique across projects)
    pub path: String,
    /// Records in file order
    pub records: Vec<Record>,
    /// Problems found while parsing; each one skipped something
    pub diagnostics: Vec<Diagnostic>,
}

impl LocalizedFile {
    pub fn new(project: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            path: path.into(),
            records: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A statement or item could not be parsed and was skipped
    MalformedRecord,
    /// A position appeared twice in one file; the last one was kept
    DuplicatePosition,
    /// A file could not be decoded or parsed at all and was skipped
    Encoding,
    /// An archive entry could not be read and was skipped
    UnreadableEntry,
    /// An entry belongs to a different language than its archive
    LanguageMismatch,
    /// A path was seen before under another project
    ProjectMismatch,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MalformedRecord => "malformed record",
            Self::DuplicatePosition => "duplicate position",
            Self::Encoding => "undecodable file",
            Self::UnreadableEntry => "unreadable entry",
            Self::LanguageMismatch => "language mismatch",
            Self::ProjectMismatch => "project mismatch",
        };
        f.write_str(name)
    }
}

/// A recoverable problem, naming the project/path/position it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub project: Option<String>,
    pub path: String,
    pub position: Option<String>,
    /// 1-based line, when the format has lines
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            project: None,
            path: path.into(),
            position: None,
            line: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: Option<String>) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Log the diagnostic at WARN and hand it back.
    #[must_use]
    pub fn logged(self) -> Self {
        tracing::warn!("{}", self);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.kind)?;
        if let Some(project) = &self.project {
            write!(f, "[{project}] ")?;
        }
        f.write_str(&self.path)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        if let Some(position) = &self.position {
            write!(f, " ({position:?})")?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(FileFormat::from_path(Path::new("a/Foo.strings")), Some(FileFormat::Strings));
        assert_eq!(FileFormat::from_path(Path::new("UIKit.LG")), Some(FileFormat::Glossary));
        assert_eq!(FileFormat::from_path(Path::new("Foo.stringsdict")), None);
        assert_eq!(FileFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(DiagnosticKind::MalformedRecord, "App/Foo.strings", "expected '='")
            .with_project("App")
            .with_line(3)
            .with_position(Some("OK".to_string()));
        assert_eq!(
            diag.to_string(),
            "malformed record: [App] App/Foo.strings:3 (\"OK\"): expected '='"
        );
    }
}
