//! `.strings` statement parser
//!
//! Statement-oriented and resilient: a statement that cannot be parsed is
//! reported and skipped, and parsing resumes on the next line (or at the
//! offending token when it already starts on a later line).

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::formats::{Diagnostic, DiagnosticKind, LocalizedFile, Record};

/// Why a statement was rejected.
struct StatementError {
    reason: String,
    /// The key, if it was read before the error.
    position: Option<String>,
    /// Where the error was detected.
    at: usize,
    at_line: usize,
    /// A quoted string ran to the end of the input.
    unterminated: bool,
}

pub(super) struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    file: &'a mut LocalizedFile,
}

impl<'a> Parser<'a> {
    pub(super) fn new(text: &str, file: &'a mut LocalizedFile) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            file,
        }
    }

    /// Parse every statement into the file's records, last occurrence of a
    /// position winning.
    pub(super) fn run(mut self) {
        let mut records: IndexMap<String, Record> = IndexMap::new();
        let mut pending_comment: Option<String> = None;
        // Line of the last statement's ';'.
        let mut last_end_line: Option<usize> = None;

        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else { break };

            if c == '/' && matches!(self.peek_at(1), Some('*' | '/')) {
                let line = self.line;
                let comment = self.comment();
                // A comment trailing a statement belongs to that statement, not the next.
                pending_comment = if last_end_line == Some(line) { None } else { comment };
                continue;
            }

            let start = self.pos;
            let start_line = self.line;
            match self.statement() {
                Ok((position, value)) => {
                    last_end_line = Some(self.line);
                    let record = Record::new(position, pending_comment.take(), value);
                    self.insert(&mut records, record, start_line);
                }
                Err(err) => {
                    pending_comment = None;
                    last_end_line = None;
                    let diag = Diagnostic::new(DiagnosticKind::MalformedRecord, self.file.path.clone(), err.reason.clone())
                        .with_project(self.file.project.clone())
                        .with_position(err.position.clone())
                        .with_line(start_line)
                        .logged();
                    self.file.diagnostics.push(diag);
                    self.recover(start, start_line, &err);
                }
            }
        }

        self.file.records = records.into_values().collect();
    }

    fn insert(&mut self, records: &mut IndexMap<String, Record>, record: Record, line: usize) {
        match records.entry(record.position.clone()) {
            Entry::Occupied(mut slot) => {
                let diag = Diagnostic::new(
                    DiagnosticKind::DuplicatePosition,
                    self.file.path.clone(),
                    "position repeated in file, keeping the last occurrence",
                )
                .with_project(self.file.project.clone())
                .with_position(Some(record.position.clone()))
                .with_line(line)
                .logged();
                self.file.diagnostics.push(diag);
                slot.insert(record);
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }

    fn recover(&mut self, start: usize, start_line: usize, err: &StatementError) {
        if err.unterminated {
            self.pos = start;
            self.line = start_line;
            self.skip_line();
        } else if err.at_line > start_line {
            self.pos = err.at;
            self.line = err.at_line;
        } else {
            self.skip_line();
        }
    }

    // ==================== Statements ====================

    fn statement(&mut self) -> Result<(String, String), StatementError> {
        let key = self.token(None, "expected a quoted or bare key")?;

        self.skip_whitespace();
        if self.peek() != Some('=') {
            return Err(self.error("expected '=' after key", Some(key.as_str())));
        }
        self.bump();

        self.skip_whitespace();
        let value = self.token(Some(key.as_str()), "expected a value after '='")?;

        self.skip_whitespace();
        if self.peek() != Some(';') {
            return Err(self.error("expected ';' after value", Some(key.as_str())));
        }
        self.bump();

        Ok((key, value))
    }

    fn token(&mut self, key: Option<&str>, expected: &str) -> Result<String, StatementError> {
        match self.peek() {
            Some('"') => self.quoted(key),
            Some(c) if is_bare(c) => {
                let mut out = String::new();
                while let Some(c) = self.peek().filter(|c| is_bare(*c)) {
                    out.push(c);
                    self.bump();
                }
                Ok(out)
            }
            _ => Err(self.error(expected, key)),
        }
    }

    fn quoted(&mut self, key: Option<&str>) -> Result<String, StatementError> {
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.unterminated(key)),
                Some('"') => return Ok(out),
                Some('\\') => {
                    let Some(escaped) = self.bump() else {
                        return Err(self.unterminated(key));
                    };
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        'u' | 'U' => self.unicode_escape(escaped, &mut out),
                        other => out.push(other),
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }

    /// `\uXXXX`, combining UTF-16 surrogate pairs written as two escapes.
    fn unicode_escape(&mut self, marker: char, out: &mut String) {
        let Some(unit) = self.hex4() else {
            out.push(marker);
            return;
        };

        if (0xD800..0xDC00).contains(&unit) {
            let save = (self.pos, self.line);
            if self.peek() == Some('\\') && matches!(self.peek_at(1), Some('u' | 'U')) {
                self.bump();
                self.bump();
                if let Some(low) = self.hex4().filter(|low| (0xDC00..0xE000).contains(low)) {
                    let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    out.push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                    return;
                }
            }
            (self.pos, self.line) = save;
            out.push(char::REPLACEMENT_CHARACTER);
            return;
        }

        out.push(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    fn hex4(&mut self) -> Option<u32> {
        let digits: String = self.chars.get(self.pos..self.pos + 4)?.iter().collect();
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(&digits, 16).ok()?;
        self.pos += 4;
        Some(value)
    }

    // ==================== Comments ====================

    /// Consume a comment, returning its trimmed text (`None` when blank).
    ///
    /// A block comment left open is reported and skipped up to the end of
    /// its first line, so the statements after it are still read.
    fn comment(&mut self) -> Option<String> {
        let start = self.pos;
        let start_line = self.line;
        self.bump(); // '/'
        let mut text = String::new();
        if self.bump() == Some('*') {
            loop {
                match self.bump() {
                    None => {
                        self.unterminated_comment(start, start_line);
                        return None;
                    }
                    Some('*') if self.peek() == Some('/') => {
                        self.bump();
                        break;
                    }
                    Some(c) => text.push(c),
                }
            }
        } else {
            while let Some(c) = self.peek().filter(|c| *c != '\n') {
                text.push(c);
                self.bump();
            }
        }

        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn unterminated_comment(&mut self, start: usize, start_line: usize) {
        let diag = Diagnostic::new(DiagnosticKind::MalformedRecord, self.file.path.clone(), "unterminated comment")
            .with_project(self.file.project.clone())
            .with_line(start_line)
            .logged();
        self.file.diagnostics.push(diag);
        self.pos = start;
        self.line = start_line;
        self.skip_line();
    }

    // ==================== Cursor ====================

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace() || c == '\u{feff}') {
            self.bump();
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn error(&self, reason: &str, key: Option<&str>) -> StatementError {
        StatementError {
            reason: reason.to_string(),
            position: key.map(str::to_string),
            at: self.pos,
            at_line: self.line,
            unterminated: false,
        }
    }

    fn unterminated(&self, key: Option<&str>) -> StatementError {
        StatementError {
            unterminated: true,
            ..self.error("unterminated string", key)
        }
    }
}

fn is_bare(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}
