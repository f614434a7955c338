//! Per-archive and per-run results

use std::fmt;
use std::path::PathBuf;

use glosskit::formats::Diagnostic;
use glosskit::locale::LanguageCode;

use crate::store::UpsertOutcome;

/// What merging one archive did.
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    /// Archive name
    pub archive: String,
    pub language: LanguageCode,
    /// Localized files written
    pub files: usize,
    /// Files dropped entirely (undecodable, unparsable, other language)
    pub files_skipped: usize,
    /// Rows created
    pub inserted: usize,
    /// Existing rows whose language column was written
    pub updated: usize,
    /// Records with nothing to write
    pub unchanged: usize,
    /// Every skip, in the order it happened
    pub diagnostics: Vec<Diagnostic>,
}

impl ArchiveReport {
    #[must_use]
    pub fn new(archive: impl Into<String>, language: LanguageCode) -> Self {
        Self {
            archive: archive.into(),
            language,
            files: 0,
            files_skipped: 0,
            inserted: 0,
            updated: 0,
            unchanged: 0,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }

    /// Records written (inserted or updated).
    #[must_use]
    pub fn records(&self) -> usize {
        self.inserted + self.updated
    }
}

impl fmt::Display for ArchiveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {} files, {} new rows, {} updated",
            self.archive, self.language, self.files, self.inserted, self.updated
        )?;
        if self.files_skipped > 0 {
            write!(f, ", {} files skipped", self.files_skipped)?;
        }
        if !self.diagnostics.is_empty() {
            write!(f, ", {} diagnostics", self.diagnostics.len())?;
        }
        Ok(())
    }
}

/// An archive that could not be merged at all.
#[derive(Debug, Clone)]
pub struct ArchiveFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Archives merged, in processing order
    pub reports: Vec<ArchiveReport>,
    /// Archives skipped entirely
    pub failures: Vec<ArchiveFailure>,
    /// Store failure that stopped the run
    pub fatal: Option<String>,
}

impl RunSummary {
    /// Whether every archive was merged and the store never failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.fatal.is_none()
    }

    /// Process exit status: 0 on success, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.is_success())
    }

    /// Diagnostics of every merged archive.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.reports.iter().flat_map(|report| report.diagnostics.iter())
    }
}
