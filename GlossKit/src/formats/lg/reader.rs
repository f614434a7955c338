//! `.lg` glossary reading

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::Glossary;
use crate::error::{Error, Result};
use crate::formats::{Diagnostic, DiagnosticKind, LocalizedFile, Record};
use crate::locale::format_language;

/// Leaf elements whose text we collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ProjName,
    Filepath,
    Description,
    Position,
    Base,
    Tran,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"ProjName" => Some(Self::ProjName),
            b"Filepath" => Some(Self::Filepath),
            b"Description" => Some(Self::Description),
            b"Position" => Some(Self::Position),
            b"base" => Some(Self::Base),
            b"tran" => Some(Self::Tran),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct TextItem {
    line: usize,
    description: Option<String>,
    position: Option<String>,
    base: Option<String>,
    /// (language, text) per `<tran>`
    translations: Vec<(String, String)>,
}

#[derive(Debug)]
struct FileBuilder {
    line: usize,
    path: Option<String>,
    records: IndexMap<String, Record>,
    diagnostics: Vec<Diagnostic>,
}

/// Streaming glossary parser state.
struct GlossaryReader<'a> {
    text: &'a str,
    container: &'a str,
    glossary: Glossary,
    field: Option<Field>,
    buf: String,
    loc: Option<String>,
    file: Option<FileBuilder>,
    item: Option<TextItem>,
    /// (byte offset, line number) of the last line lookup
    line_cursor: (usize, usize),
}

/// Parse decoded glossary XML.
pub(super) fn read_glossary(text: &str, project_fallback: &str, container: &str) -> Result<Glossary> {
    let mut reader = Reader::from_str(text);
    // Don't trim text - translations keep their leading/trailing whitespace
    reader.trim_text(false);

    let mut state = GlossaryReader {
        text,
        container,
        glossary: Glossary {
            project: project_fallback.to_string(),
            language: None,
            files: Vec::new(),
            diagnostics: Vec::new(),
        },
        field: None,
        buf: String::new(),
        loc: None,
        file: None,
        item: None,
        line_cursor: (0, 1),
    };

    loop {
        let offset = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => state.start(&e, offset, false)?,
            Ok(Event::Empty(e)) => state.start(&e, offset, true)?,
            Ok(Event::Text(e)) => {
                if state.field.is_some() {
                    state.buf.push_str(&e.unescape()?);
                }
            }
            Ok(Event::CData(e)) => {
                if state.field.is_some() {
                    state.buf.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(e)) => state.end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(state.glossary)
}

/// Language of the first `<tran>` element, without parsing the rest.
pub(super) fn first_translation_language(text: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.name().as_ref() == b"tran" => {
                return Ok(loc_attribute(&e)?.map(|loc| format_language(&loc)));
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }
}

fn loc_attribute(e: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"loc" {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

impl GlossaryReader<'_> {
    fn start(&mut self, e: &BytesStart<'_>, offset: usize, empty: bool) -> Result<()> {
        let name = e.name();
        match name.as_ref() {
            b"File" => {
                let line = self.line_at(offset);
                self.file = Some(FileBuilder {
                    line,
                    path: None,
                    records: IndexMap::new(),
                    diagnostics: Vec::new(),
                });
                if empty {
                    self.end(b"File");
                }
                return Ok(());
            }
            b"TextItem" => {
                let line = self.line_at(offset);
                self.item = Some(TextItem {
                    line,
                    ..TextItem::default()
                });
                if empty {
                    self.end(b"TextItem");
                }
                return Ok(());
            }
            _ => {}
        }

        let Some(field) = Field::from_name(name.as_ref()) else {
            return Ok(());
        };

        if matches!(field, Field::Base | Field::Tran) {
            self.loc = loc_attribute(e)?.map(|loc| format_language(&loc));
            if field == Field::Tran && self.glossary.language.is_none() {
                self.glossary.language.clone_from(&self.loc);
            }
        }

        self.field = Some(field);
        self.buf.clear();
        if empty {
            self.end(name.as_ref());
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"TextItem" => self.finish_item(),
            b"File" => self.finish_file(),
            _ => {
                if let Some(field) = Field::from_name(name)
                    && self.field == Some(field)
                {
                    self.field = None;
                    let text = std::mem::take(&mut self.buf);
                    self.finish_field(field, text);
                }
            }
        }
    }

    fn finish_field(&mut self, field: Field, text: String) {
        let trimmed = || Some(text.trim().to_string()).filter(|t| !t.is_empty());
        match field {
            Field::ProjName => {
                if let Some(project) = trimmed() {
                    self.glossary.project = project;
                }
            }
            Field::Filepath => {
                if let Some(file) = self.file.as_mut() {
                    file.path = trimmed();
                }
            }
            Field::Description => {
                if let Some(item) = self.item.as_mut() {
                    item.description = trimmed();
                }
            }
            Field::Position => {
                if let Some(item) = self.item.as_mut() {
                    item.position = trimmed();
                }
            }
            Field::Base => {
                if let Some(item) = self.item.as_mut() {
                    item.base = Some(text);
                }
            }
            Field::Tran => {
                let loc = self.loc.take().unwrap_or_default();
                if let Some(item) = self.item.as_mut() {
                    item.translations.push((loc, text));
                }
            }
        }
    }

    fn finish_item(&mut self) {
        let Some(item) = self.item.take() else { return };
        let project = self.glossary.project.clone();
        let language = self.glossary.language.clone();
        let container = self.container;
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let path = file.path.clone().unwrap_or_else(|| container.to_string());

        let malformed = |kind: DiagnosticKind, position: Option<String>, message: String| {
            Diagnostic::new(kind, path.clone(), message)
                .with_project(project.clone())
                .with_position(position)
                .with_line(item.line)
                .logged()
        };

        let Some(position) = item.position.clone() else {
            let diag = malformed(DiagnosticKind::MalformedRecord, None, "text item without a Position".to_string());
            file.diagnostics.push(diag);
            return;
        };

        let in_language = |loc: &str| language.as_deref().is_some_and(|lang| loc.eq_ignore_ascii_case(lang));
        let translation = item.translations.iter().find(|(loc, _)| in_language(loc.as_str()));
        let Some((_, value)) = translation else {
            let diag = if item.translations.is_empty() {
                malformed(DiagnosticKind::MalformedRecord, Some(position), "text item without a translation".to_string())
            } else {
                let found: Vec<_> = item.translations.iter().map(|(loc, _)| loc.as_str()).collect();
                malformed(
                    DiagnosticKind::LanguageMismatch,
                    Some(position),
                    format!(
                        "translation is in {} but the glossary is {}",
                        found.join(", "),
                        language.as_deref().unwrap_or("?")
                    ),
                )
            };
            file.diagnostics.push(diag);
            return;
        };

        for (loc, _) in item.translations.iter().filter(|(loc, _)| !in_language(loc.as_str())) {
            let diag = malformed(
                DiagnosticKind::LanguageMismatch,
                Some(position.clone()),
                format!("ignoring extra translation in {loc}"),
            );
            file.diagnostics.push(diag);
        }

        let record = if value.is_empty() {
            Record::untranslated(position.clone(), item.description.clone())
        } else {
            Record::new(position.clone(), item.description.clone(), value.clone())
        }
        .with_baseline(item.base.clone());
        if file.records.insert(position.clone(), record).is_some() {
            let diag = malformed(
                DiagnosticKind::DuplicatePosition,
                Some(position),
                "position repeated in file, keeping the last occurrence".to_string(),
            );
            file.diagnostics.push(diag);
        }
    }

    fn finish_file(&mut self) {
        let Some(builder) = self.file.take() else { return };
        let project = self.glossary.project.clone();

        let Some(path) = builder.path else {
            let diag = Diagnostic::new(
                DiagnosticKind::MalformedRecord,
                self.container,
                format!("File element without a Filepath ({} items skipped)", builder.records.len()),
            )
            .with_project(project)
            .with_line(builder.line)
            .logged();
            self.glossary.diagnostics.push(diag);
            return;
        };

        let mut file = LocalizedFile::new(project, path);
        file.records = builder.records.into_values().collect();
        file.diagnostics = builder.diagnostics;
        self.glossary.files.push(file);
    }

    /// Line of `offset`. Offsets only grow, so counting resumes where the
    /// previous lookup stopped.
    fn line_at(&mut self, offset: usize) -> usize {
        let (seen, line) = self.line_cursor;
        let end = offset.clamp(seen, self.text.len());
        let line = line + self.text.as_bytes()[seen..end].iter().filter(|&&b| b == b'\n').count();
        self.line_cursor = (end, line);
        line
    }
}
