//! SQLite store
//!
//! Wraps the destination database. Every write is resolve-or-create:
//! files are identified by path, localizations by (file, position), and a
//! row is only ever augmented after its first insertion.

mod schema;

use std::path::Path;

use glosskit::locale::LanguageCode;
use rusqlite::{Connection, OptionalExtension, Transaction};

use crate::error::Result;
pub use schema::FIXED_COLUMNS;

/// A row of `Files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub id: i64,
    /// Project stored when the path was first seen
    pub project: String,
    /// Whether this call inserted the row
    pub created: bool,
}

/// What [`Store::upsert_localization`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new row was created
    Inserted,
    /// The language column of an existing row was written
    Updated,
    /// Nothing to write (baseline row already present)
    Unchanged,
}

/// A row of `Localizations`, with every language column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizationRow {
    pub file_id: i64,
    pub position: String,
    pub description: Option<String>,
    /// (column, value) for `en` and each language column, in table order
    pub values: Vec<(String, Option<String>)>,
}

impl LocalizationRow {
    /// Value of a language column; `None` when unset or unknown.
    #[must_use]
    pub fn value(&self, language: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(language))
            .and_then(|(_, value)| value.as_deref())
    }
}

/// The destination database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a database file and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::initialize(conn)
    }

    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch(schema::CREATE_SCHEMA)?;
        Ok(Self { conn })
    }

    /// Start a transaction. Dropping it without `commit` rolls back.
    pub fn begin(&self) -> Result<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    // ==================== Schema ====================

    /// Language columns of `Localizations` (`en` first), in table order.
    pub fn language_columns(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info('Localizations') ORDER BY cid")?;
        let iter = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut columns = Vec::new();
        for name in iter {
            let name = name?;
            if !is_fixed_column(&name) {
                columns.push(name);
            }
        }
        Ok(columns)
    }

    /// Add a nullable column for a language. Returns `false` if it exists.
    pub fn add_language_column(&self, language: &LanguageCode) -> Result<bool> {
        if self
            .language_columns()?
            .iter()
            .any(|column| language.same_column(column))
        {
            return Ok(false);
        }

        let sql = format!(
            "ALTER TABLE Localizations ADD COLUMN {} TEXT",
            quote_identifier(language.as_str())
        );
        self.conn.execute_batch(&sql)?;
        Ok(true)
    }

    // ==================== Writes ====================

    /// Resolve a file by path, inserting `(project, path)` if absent.
    ///
    /// An existing row keeps its project; compare [`FileRow::project`] to
    /// detect a conflict.
    pub fn upsert_file(&self, project: &str, path: &str) -> Result<FileRow> {
        if let Some(existing) = self.file(path)? {
            return Ok(existing);
        }

        self.conn
            .prepare_cached("INSERT INTO Files (project, path) VALUES (?1, ?2)")?
            .execute((project, path))?;
        Ok(FileRow {
            id: self.conn.last_insert_rowid(),
            project: project.to_string(),
            created: true,
        })
    }

    /// Write one value into a localization row.
    ///
    /// A missing row is created with `description` and `baseline`. An
    /// existing row only gets `language`'s column (over)written; its
    /// description and `en` are left alone. For the baseline language there
    /// is no separate column, so an existing row is left unchanged.
    pub fn upsert_localization(
        &self,
        file_id: i64,
        position: &str,
        description: Option<&str>,
        baseline: &str,
        language: &LanguageCode,
        value: Option<&str>,
    ) -> Result<UpsertOutcome> {
        if language.is_baseline() {
            let exists = self
                .conn
                .prepare_cached("SELECT 1 FROM Localizations WHERE file_id = ?1 AND position = ?2")?
                .query_row((file_id, position), |_| Ok(()))
                .optional()?
                .is_some();
            if exists {
                return Ok(UpsertOutcome::Unchanged);
            }
            self.conn
                .prepare_cached(
                    "INSERT INTO Localizations (file_id, position, description, en) VALUES (?1, ?2, ?3, ?4)",
                )?
                .execute((file_id, position, description, baseline))?;
            return Ok(UpsertOutcome::Inserted);
        }

        let column = quote_identifier(language.as_str());
        let updated = self
            .conn
            .prepare_cached(&format!(
                "UPDATE Localizations SET {column} = ?1 WHERE file_id = ?2 AND position = ?3"
            ))?
            .execute((value, file_id, position))?;
        if updated > 0 {
            return Ok(UpsertOutcome::Updated);
        }

        self.conn
            .prepare_cached(&format!(
                "INSERT INTO Localizations (file_id, position, description, en, {column}) VALUES (?1, ?2, ?3, ?4, ?5)"
            ))?
            .execute((file_id, position, description, baseline, value))?;
        Ok(UpsertOutcome::Inserted)
    }

    // ==================== Reads ====================

    /// Look up a file by path.
    pub fn file(&self, path: &str) -> Result<Option<FileRow>> {
        let row = self
            .conn
            .prepare_cached("SELECT id, project FROM Files WHERE path = ?1")?
            .query_row([path], |row| {
                Ok(FileRow {
                    id: row.get(0)?,
                    project: row.get(1)?,
                    created: false,
                })
            })
            .optional()?;
        Ok(row)
    }

    /// Look up a localization by file path and position.
    pub fn localization(&self, path: &str, position: &str) -> Result<Option<LocalizationRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT l.* FROM Localizations l JOIN Files f ON f.id = l.file_id \
             WHERE f.path = ?1 AND l.position = ?2",
        )?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let row = stmt
            .query_row((path, position), |row| {
                let mut values = Vec::new();
                for (i, name) in names.iter().enumerate() {
                    if !is_fixed_column(name) {
                        values.push((name.clone(), row.get::<_, Option<String>>(i)?));
                    }
                }
                Ok(LocalizationRow {
                    file_id: row.get("file_id")?,
                    position: row.get("position")?,
                    description: row.get("description")?,
                    values,
                })
            })
            .optional()?;
        Ok(row)
    }

    pub fn file_count(&self) -> Result<usize> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM Files", [], |row| row.get(0))?)
    }

    pub fn localization_count(&self) -> Result<usize> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM Localizations", [], |row| row.get(0))?)
    }
}

fn is_fixed_column(name: &str) -> bool {
    FIXED_COLUMNS.iter().any(|fixed| fixed.eq_ignore_ascii_case(name))
}

/// `fr` -> `"fr"`
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn lang(tag: &str) -> LanguageCode {
        LanguageCode::parse(tag).unwrap()
    }

    #[test]
    fn test_fresh_schema() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.language_columns().unwrap(), vec!["en"]);
        assert_eq!(store.file_count().unwrap(), 0);
        assert_eq!(store.localization_count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_file_resolves_same_id() {
        let store = Store::open_in_memory().unwrap();
        let first = store.upsert_file("App", "App/Foo.strings").unwrap();
        assert!(first.created);

        let again = store.upsert_file("Other", "App/Foo.strings").unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.project, "App");
        assert!(!again.created);
        assert_eq!(store.file_count().unwrap(), 1);
    }

    #[test]
    fn test_add_language_column() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.add_language_column(&lang("fr")).unwrap());
        assert!(!store.add_language_column(&lang("fr")).unwrap());
        assert!(!store.add_language_column(&lang("FR")).unwrap());
        assert!(!store.add_language_column(&lang("en")).unwrap());
        assert!(store.add_language_column(&lang("zh-Hans")).unwrap());
        assert_eq!(store.language_columns().unwrap(), vec!["en", "fr", "zh_Hans"]);
    }

    #[test]
    fn test_upsert_localization() {
        let store = Store::open_in_memory().unwrap();
        store.add_language_column(&lang("fr")).unwrap();
        store.add_language_column(&lang("de")).unwrap();
        let file = store.upsert_file("App", "App/Foo.strings").unwrap();

        let outcome = store
            .upsert_localization(file.id, "OK", Some("Confirm"), "OK", &lang("fr"), Some("Valider"))
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        let outcome = store
            .upsert_localization(file.id, "OK", Some("Other"), "Okay", &lang("de"), Some("Bestätigen"))
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);

        let row = store.localization("App/Foo.strings", "OK").unwrap().unwrap();
        assert_eq!(row.description.as_deref(), Some("Confirm"));
        assert_eq!(row.value("en"), Some("OK"));
        assert_eq!(row.value("fr"), Some("Valider"));
        assert_eq!(row.value("DE"), Some("Bestätigen"));
        assert_eq!(row.value("ja"), None);
    }

    #[test]
    fn test_same_language_overwrites() {
        let store = Store::open_in_memory().unwrap();
        store.add_language_column(&lang("fr")).unwrap();
        let file = store.upsert_file("App", "App/Foo.strings").unwrap();
        store.upsert_localization(file.id, "OK", None, "OK", &lang("fr"), Some("D'accord")).unwrap();
        store.upsert_localization(file.id, "OK", None, "OK", &lang("fr"), Some("Valider")).unwrap();

        let row = store.localization("App/Foo.strings", "OK").unwrap().unwrap();
        assert_eq!(row.value("fr"), Some("Valider"));
        assert_eq!(store.localization_count().unwrap(), 1);
    }

    #[test]
    fn test_untranslated_value_is_null() {
        let store = Store::open_in_memory().unwrap();
        store.add_language_column(&lang("fr")).unwrap();
        let file = store.upsert_file("App", "App/Menu.strings").unwrap();
        store.upsert_localization(file.id, "Quit", None, "Quit", &lang("fr"), None).unwrap();

        let row = store.localization("App/Menu.strings", "Quit").unwrap().unwrap();
        assert_eq!(row.value("en"), Some("Quit"));
        assert_eq!(row.value("fr"), None);
        assert!(row.values.iter().any(|(lang, value)| lang == "fr" && value.is_none()));
    }

    #[test]
    fn test_baseline_language_never_rewrites() {
        let store = Store::open_in_memory().unwrap();
        let file = store.upsert_file("App", "App/Foo.strings").unwrap();
        let en = LanguageCode::baseline();

        let first = store.upsert_localization(file.id, "OK", None, "OK", &en, Some("OK")).unwrap();
        let second = store.upsert_localization(file.id, "OK", None, "Okay", &en, Some("Okay")).unwrap();
        assert_eq!(first, UpsertOutcome::Inserted);
        assert_eq!(second, UpsertOutcome::Unchanged);

        let row = store.localization("App/Foo.strings", "OK").unwrap().unwrap();
        assert_eq!(row.value("en"), Some("OK"));
    }

    #[test]
    fn test_constraints() {
        let store = Store::open_in_memory().unwrap();
        let file = store.upsert_file("App", "App/Foo.strings").unwrap();

        let duplicate_path = store
            .conn
            .execute("INSERT INTO Files (project, path) VALUES ('X', 'App/Foo.strings')", []);
        assert!(duplicate_path.is_err());

        store
            .upsert_localization(file.id, "OK", None, "OK", &LanguageCode::baseline(), Some("OK"))
            .unwrap();
        let duplicate_position = store.conn.execute(
            "INSERT INTO Localizations (file_id, position, en) VALUES (?1, 'OK', 'x')",
            [file.id],
        );
        assert!(duplicate_position.is_err());

        let err = store
            .upsert_localization(file.id + 100, "OK", None, "OK", &LanguageCode::baseline(), Some("OK"))
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[test]
    fn test_transaction_rollback() {
        let store = Store::open_in_memory().unwrap();
        {
            let _tx = store.begin().unwrap();
            store.upsert_file("App", "App/Foo.strings").unwrap();
        }
        assert_eq!(store.file_count().unwrap(), 0);

        let tx = store.begin().unwrap();
        store.upsert_file("App", "App/Foo.strings").unwrap();
        tx.commit().unwrap();
        assert_eq!(store.file_count().unwrap(), 1);
    }

    #[test]
    fn test_reopen_keeps_columns() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ios.sqlite");
        {
            let store = Store::open(&path).unwrap();
            store.add_language_column(&lang("ja")).unwrap();
            store.upsert_file("App", "App/Foo.strings").unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.language_columns().unwrap(), vec!["en", "ja"]);
        assert_eq!(store.file_count().unwrap(), 1);
    }
}
