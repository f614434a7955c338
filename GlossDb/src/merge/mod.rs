//! Merge engine
//!
//! Merges language archives into the store one at a time, in order. Each
//! archive is written in a single transaction: a store failure rolls the
//! archive back and stops the run, while per-file and per-record problems
//! only produce diagnostics.
//!
//! # Example
//!
//! ```no_run
//! use glossdb::merge::MergeEngine;
//! use glossdb::options::ConvertOptions;
//! use glossdb::store::Store;
//!
//! let store = Store::open("ios.sqlite")?;
//! let mut engine = MergeEngine::new(&store, ConvertOptions::default())?;
//! let summary = engine.convert(&["English.dmg", "French.dmg", "German.dmg"]);
//! println!("{} merged, {} skipped", summary.reports.len(), summary.failures.len());
//! # Ok::<(), glossdb::Error>(())
//! ```

mod report;

pub use report::{ArchiveFailure, ArchiveReport, RunSummary};

use std::path::Path;

use glosskit::archive::{ArchiveEntry, ArchiveReader, MountedArchive};
use glosskit::formats::{Diagnostic, DiagnosticKind, LocalizedFile};
use glosskit::locale::{BASE_LOCALE, BASELINE, LanguageCode};

use crate::error::{Error, Result};
use crate::options::{ConflictPolicy, ConvertOptions};
use crate::registry::LanguageRegistry;
use crate::store::Store;

/// Progress information passed to [`MergeEngine::convert_with_progress`].
#[derive(Debug, Clone, Copy)]
pub struct ConvertProgress<'a> {
    /// 1-based index of the archive about to be merged
    pub current: usize,
    pub total: usize,
    pub archive: &'a Path,
}

/// Merges archives into a [`Store`].
pub struct MergeEngine<'s> {
    store: &'s Store,
    registry: LanguageRegistry,
    options: ConvertOptions,
}

impl<'s> MergeEngine<'s> {
    /// Create an engine over `store`, reading the languages it already has.
    pub fn new(store: &'s Store, options: ConvertOptions) -> Result<Self> {
        let registry = LanguageRegistry::load(store)?;
        Ok(Self {
            store,
            registry,
            options,
        })
    }

    #[must_use]
    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    #[must_use]
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Merge every archive in order.
    ///
    /// Archives that fail entirely are recorded and skipped; a store
    /// failure stops the run.
    pub fn convert<P: AsRef<Path>>(&mut self, archives: &[P]) -> RunSummary {
        self.convert_with_progress(archives, |_| {})
    }

    /// [`convert`](Self::convert), calling `progress` before each archive.
    pub fn convert_with_progress<P, F>(&mut self, archives: &[P], mut progress: F) -> RunSummary
    where
        P: AsRef<Path>,
        F: FnMut(&ConvertProgress<'_>),
    {
        let mut summary = RunSummary::default();
        let total = archives.len();

        for (i, archive) in archives.iter().enumerate() {
            let path = archive.as_ref();
            progress(&ConvertProgress {
                current: i + 1,
                total,
                archive: path,
            });

            match self.merge_archive(path) {
                Ok(report) => {
                    tracing::info!("{}", report);
                    summary.reports.push(report);
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!("Stopping at {}: {}", path.display(), e);
                    summary.fatal = Some(format!("{}: {}", path.display(), e));
                    break;
                }
                Err(e) => {
                    tracing::warn!("Skipping archive {}: {}", path.display(), e);
                    summary.failures.push(ArchiveFailure {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    });
                }
            }
        }

        summary
    }

    /// Mount an archive (directory, `.zip` or `.dmg`) and merge it.
    pub fn merge_archive<P: AsRef<Path>>(&mut self, path: P) -> Result<ArchiveReport> {
        let mounted = MountedArchive::open(path.as_ref())?;
        let reader = mounted.reader()?;
        self.merge_reader(&reader)
    }

    /// Merge an already readable archive.
    pub fn merge_reader(&mut self, reader: &ArchiveReader) -> Result<ArchiveReport> {
        let language = self
            .registry
            .ensure_language(self.store, &reader.detect_language())?;
        tracing::info!("Merging {} as {}", reader.name(), language);

        let mut report = ArchiveReport::new(reader.name(), language);
        let tx = self.store.begin()?;

        let mut entries = reader.entries();
        while let Some(entry) = entries.next() {
            report.diagnostics.append(&mut entries.take_diagnostics());
            self.merge_entry(&entry, &mut report)?;
        }
        report.diagnostics.append(&mut entries.take_diagnostics());

        tx.commit()?;
        Ok(report)
    }

    /// Merge files parsed elsewhere as one archive of language `tag`.
    pub fn merge_files(&mut self, archive: &str, tag: &str, files: Vec<LocalizedFile>) -> Result<ArchiveReport> {
        let language = self.registry.ensure_language(self.store, tag)?;
        let mut report = ArchiveReport::new(archive, language);

        let tx = self.store.begin()?;
        for file in files {
            self.merge_file(file, &mut report)?;
        }
        tx.commit()?;
        Ok(report)
    }

    fn merge_entry(&self, entry: &ArchiveEntry, report: &mut ArchiveReport) -> Result<()> {
        let mut parsed = match entry.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                let diag = Diagnostic::new(DiagnosticKind::Encoding, entry.path.clone(), e.to_string())
                    .with_project(entry.project.clone())
                    .logged();
                report.diagnostics.push(diag);
                report.files_skipped += 1;
                return Ok(());
            }
        };

        report.files_skipped += parsed.diagnostics.len();
        report.diagnostics.append(&mut parsed.diagnostics);

        if let Some(tag) = parsed.language.as_deref()
            && !belongs_to(&report.language, tag)
        {
            let diag = Diagnostic::new(
                DiagnosticKind::LanguageMismatch,
                entry.path.clone(),
                format!("entry is {tag} but the archive is {}", report.language),
            )
            .with_project(entry.project.clone())
            .logged();
            report.diagnostics.push(diag);
            report.files_skipped += parsed.files.len().max(1);
            return Ok(());
        }

        for file in parsed.files {
            self.merge_file(file, report)?;
        }
        Ok(())
    }

    fn merge_file(&self, mut file: LocalizedFile, report: &mut ArchiveReport) -> Result<()> {
        report.diagnostics.append(&mut file.diagnostics);

        let row = self.store.upsert_file(&file.project, &file.path)?;
        if row.project != file.project {
            match self.options.project_conflict {
                ConflictPolicy::KeepFirst => {
                    let diag = Diagnostic::new(
                        DiagnosticKind::ProjectMismatch,
                        file.path.clone(),
                        format!("already stored under project {:?}, keeping it", row.project),
                    )
                    .with_project(file.project.clone())
                    .logged();
                    report.diagnostics.push(diag);
                }
                ConflictPolicy::Fail => {
                    return Err(Error::ProjectConflict {
                        path: file.path,
                        existing: row.project,
                        incoming: file.project,
                    });
                }
            }
        }

        let language = report.language.clone();
        for record in &file.records {
            let outcome = self.store.upsert_localization(
                row.id,
                &record.position,
                record.description.as_deref(),
                record.baseline_or_value(),
                &language,
                record.value.as_deref(),
            )?;
            report.record(outcome);
        }
        report.files += 1;
        tracing::debug!("{}: {} records", file.path, file.records.len());
        Ok(())
    }
}

/// Whether an entry's declared language is the archive's.
/// `Base.lproj` holds the development language, i.e. the baseline.
fn belongs_to(language: &LanguageCode, tag: &str) -> bool {
    let tag = if tag.eq_ignore_ascii_case(BASE_LOCALE) {
        BASELINE
    } else {
        tag
    };
    language.same_column(tag)
}

/// Open the configured database and merge `archives` into it.
pub fn run<P: AsRef<Path>>(options: &ConvertOptions, archives: &[P]) -> Result<RunSummary> {
    let store = Store::open(&options.database)?;
    let mut engine = MergeEngine::new(&store, options.clone())?;
    Ok(engine.convert(archives))
}
