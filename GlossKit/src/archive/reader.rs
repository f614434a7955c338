//! Archive traversal and classification

use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::ArchiveEntry;
use crate::error::{Error, Result};
use crate::formats::{Diagnostic, DiagnosticKind, FileFormat, lg};
use crate::locale::{BASE_LOCALE, format_language};

type Walker = walkdir::FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>;

/// Reads the localization files of one mounted archive.
#[derive(Debug, Clone)]
pub struct ArchiveReader {
    root: PathBuf,
    name: String,
}

impl ArchiveReader {
    /// Open an archive root.
    ///
    /// The archive name (used as the project of root-level files and as the
    /// last-resort language) defaults to the root's file stem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveUnreadable`] if the root cannot be listed.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::read_dir(&root).map_err(|e| Error::ArchiveUnreadable {
            path: root.clone(),
            reason: e.to_string(),
        })?;

        let name = root
            .file_stem()
            .map_or_else(|| "archive".to_string(), |s| s.to_string_lossy().into_owned());
        Ok(Self { root, name })
    }

    /// Override the archive name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Localization files in traversal order (sorted by file name).
    #[must_use]
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            reader: self,
            walker: walk(&self.root),
            diagnostics: Vec::new(),
        }
    }

    /// Derive the archive's language tag (normalized, not yet validated).
    ///
    /// Preference: the first glossary's first `<tran loc>`, then the first
    /// `.lproj` directory other than `Base.lproj`, then the archive name.
    #[must_use]
    pub fn detect_language(&self) -> String {
        let mut lproj = None;

        for entry in walk(&self.root).filter_map(std::result::Result::ok) {
            let path = entry.path();
            if entry.file_type().is_dir() {
                if lproj.is_none()
                    && let Some(tag) = entry.file_name().to_str().and_then(lproj_tag)
                    && !tag.eq_ignore_ascii_case(BASE_LOCALE)
                {
                    lproj = Some(format_language(tag));
                }
                continue;
            }

            if FileFormat::from_path(path) != Some(FileFormat::Glossary) {
                continue;
            }
            let language = std::fs::read(path)
                .map_err(Error::from)
                .and_then(|bytes| lg::glossary_language(&bytes, &self.relative(path)));
            match language {
                Ok(Some(language)) => return language,
                Ok(None) => {}
                Err(e) => tracing::debug!("No language from {}: {}", path.display(), e),
            }
        }

        lproj.unwrap_or_else(|| format_language(&self.name))
    }

    fn classify(&self, path: &Path, format: FileFormat, bytes: Vec<u8>) -> ArchiveEntry {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let components: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let mut locale = None;
        let mut parts = Vec::with_capacity(components.len());
        let last = components.len().saturating_sub(1);
        for (i, part) in components.into_iter().enumerate() {
            if i < last
                && let Some(tag) = lproj_tag(&part)
            {
                if locale.is_none() {
                    locale = Some(format_language(tag));
                }
                continue;
            }
            parts.push(part);
        }

        let project = if parts.len() > 1 {
            parts[0].clone()
        } else {
            self.name.clone()
        };

        ArchiveEntry {
            project,
            path: parts.join("/"),
            locale,
            format,
            bytes,
            source: path.to_path_buf(),
        }
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Lazy iterator over an archive's localization files.
///
/// Entries that cannot be read are skipped; their diagnostics are kept and
/// can be collected with [`Entries::take_diagnostics`].
pub struct Entries<'a> {
    reader: &'a ArchiveReader,
    walker: Walker,
    diagnostics: Vec<Diagnostic>,
}

impl Entries<'_> {
    /// Diagnostics for entries skipped so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn skip(&mut self, path: &Path, message: String) {
        let diag = Diagnostic::new(DiagnosticKind::UnreadableEntry, self.reader.relative(path), message)
            .with_project(self.reader.name.clone())
            .logged();
        self.diagnostics.push(diag);
    }
}

impl Iterator for Entries<'_> {
    type Item = ArchiveEntry;

    fn next(&mut self) -> Option<ArchiveEntry> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map_or_else(|| self.reader.root.clone(), Path::to_path_buf);
                    self.skip(&path, Error::from(err).to_string());
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let Some(format) = FileFormat::from_path(entry.path()) else {
                continue;
            };

            match std::fs::read(entry.path()) {
                Ok(bytes) => return Some(self.reader.classify(entry.path(), format, bytes)),
                Err(source) => {
                    let err = Error::UnreadableEntry {
                        path: entry.path().to_path_buf(),
                        source,
                    };
                    self.skip(entry.path(), err.to_string());
                }
            }
        }
    }
}

fn walk(root: &Path) -> Walker {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(is_visible as fn(&DirEntry) -> bool)
}

/// Skip macOS resource-fork litter (`__MACOSX/`, `._Foo.strings`).
fn is_visible(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name != "__MACOSX" && !name.starts_with("._")
}

/// `fr.lproj` -> `fr`
fn lproj_tag(name: &str) -> Option<&str> {
    let split = name.len().checked_sub(".lproj".len())?;
    let (tag, ext) = name.split_at_checked(split)?;
    (ext.eq_ignore_ascii_case(".lproj") && !tag.is_empty()).then_some(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_lproj_tag() {
        assert_eq!(lproj_tag("fr.lproj"), Some("fr"));
        assert_eq!(lproj_tag("zh-Hans.LPROJ"), Some("zh-Hans"));
        assert_eq!(lproj_tag(".lproj"), None);
        assert_eq!(lproj_tag("lproj"), None);
        assert_eq!(lproj_tag("Foo.strings"), None);
    }

    #[test]
    fn test_unreadable_root() {
        let temp = TempDir::new().unwrap();
        let err = ArchiveReader::open(temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::ArchiveUnreadable { .. }));
    }

    #[test]
    fn test_entries_are_classified() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("French");
        write(&root, "App/fr.lproj/Foo.strings", "\"OK\" = \"OK\";");
        write(&root, "App/Images/logo.png", "png");
        write(&root, "Settings/Root.strings", "");
        write(&root, "Top.strings", "");
        write(&root, "__MACOSX/App/._Foo.strings", "junk");

        let reader = ArchiveReader::open(&root).unwrap();
        assert_eq!(reader.name(), "French");

        let entries: Vec<_> = reader.entries().collect();
        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.project.as_str(), e.path.as_str(), e.locale.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("App", "App/Foo.strings", Some("fr")),
                ("Settings", "Settings/Root.strings", None),
                ("French", "Top.strings", None),
            ]
        );
        assert_eq!(entries[0].bytes, b"\"OK\" = \"OK\";");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_entry_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("French");
        write(&root, "App/fr.lproj/Bar.strings", "\"A\" = \"a\";");
        write(&root, "App/fr.lproj/Foo.strings", "\"B\" = \"b\";");
        std::os::unix::fs::symlink(root.join("missing"), root.join("App/fr.lproj/Gone.strings")).unwrap();

        let reader = ArchiveReader::open(&root).unwrap();
        let mut entries = reader.entries();
        let paths: Vec<_> = entries.by_ref().map(|e| e.path).collect();
        assert_eq!(paths, vec!["App/Bar.strings", "App/Foo.strings"]);

        let diagnostics = entries.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnreadableEntry);
        assert!(diagnostics[0].path.contains("Gone.strings"));
        assert!(entries.take_diagnostics().is_empty());
    }

    #[test]
    fn test_language_from_lproj() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "App/Base.lproj/Main.strings", "");
        write(temp.path(), "App/pt-PT.lproj/Main.strings", "");
        let reader = ArchiveReader::open(temp.path()).unwrap();
        assert_eq!(reader.detect_language(), "pt_PT");
    }

    #[test]
    fn test_language_from_glossary_wins() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "App/de.lproj/Main.strings", "");
        write(
            temp.path(),
            "Glossaries/UIKit.lg",
            r#"<Proj><File><TextItem><TranslationSet><tran loc="ja">x</tran></TranslationSet></TextItem></File></Proj>"#,
        );
        let reader = ArchiveReader::open(temp.path()).unwrap();
        assert_eq!(reader.detect_language(), "ja");
    }

    #[test]
    fn test_language_from_name() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("ko");
        write(&root, "App/Foo.strings", "");
        let reader = ArchiveReader::open(&root).unwrap();
        assert_eq!(reader.detect_language(), "ko");
        assert_eq!(reader.with_name("zh-TW").detect_language(), "zh_TW");
    }
}
