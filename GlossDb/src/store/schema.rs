//! Database Schema
//!
//! The two tables every run writes to. Language columns beyond `en` are
//! added at runtime.

/// Columns of `Localizations` that are not language columns.
pub const FIXED_COLUMNS: [&str; 3] = ["file_id", "position", "description"];

/// Schema creation SQL
pub const CREATE_SCHEMA: &str = r"
PRAGMA foreign_keys = ON;

-- One row per localized resource file
CREATE TABLE IF NOT EXISTS Files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project TEXT NOT NULL,
    path TEXT NOT NULL UNIQUE
);

-- One row per (file, position); one TEXT column per language
CREATE TABLE IF NOT EXISTS Localizations (
    file_id INTEGER NOT NULL,
    position TEXT NOT NULL,
    description TEXT,
    en TEXT NOT NULL,
    FOREIGN KEY (file_id) REFERENCES Files(id)
);

CREATE UNIQUE INDEX IF NOT EXISTS LocalizationIndex ON Localizations(file_id, position);
";
