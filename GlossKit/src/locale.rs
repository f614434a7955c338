//! Language codes
//!
//! Archives name their language with locale tags such as `fr`, `zh-Hans`,
//! `pt_PT` or `es_419`. Tags become column names in the destination
//! database, so they are normalized (dashes become underscores) and checked
//! against a strict identifier grammar before use.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// The baseline language. Its values live in the `en` column.
pub const BASELINE: &str = "en";

/// Locale tag of Xcode's development-language folder (`Base.lproj`).
pub const BASE_LOCALE: &str = "Base";

static LOCALE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn locale_pattern() -> &'static Regex {
    LOCALE_PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{2,3}(_[A-Za-z0-9]{2,8})*$").expect("valid locale pattern")
    })
}

/// Normalize a locale tag the way column names are spelled (`zh-Hans` -> `zh_Hans`).
#[must_use]
pub fn format_language(tag: &str) -> String {
    tag.trim().replace('-', "_")
}

/// A validated, normalized language code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Normalize and validate a locale tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLanguageCode`] if the tag is empty or is not a
    /// locale identifier.
    pub fn parse(tag: &str) -> Result<Self> {
        let code = format_language(tag);
        if code.is_empty() || !locale_pattern().is_match(&code) {
            return Err(Error::InvalidLanguageCode(tag.to_string()));
        }
        Ok(Self(code))
    }

    /// The baseline language code.
    #[must_use]
    pub fn baseline() -> Self {
        Self(BASELINE.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the baseline language.
    #[must_use]
    pub fn is_baseline(&self) -> bool {
        self.0.eq_ignore_ascii_case(BASELINE)
    }

    /// Compare the way SQLite compares column names.
    #[must_use]
    pub fn same_column(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_codes() {
        assert_eq!(LanguageCode::parse("fr").unwrap().as_str(), "fr");
        assert_eq!(LanguageCode::parse("pt_PT").unwrap().as_str(), "pt_PT");
        assert_eq!(LanguageCode::parse("es_419").unwrap().as_str(), "es_419");
    }

    #[test]
    fn test_dashes_normalized() {
        assert_eq!(LanguageCode::parse("zh-Hans").unwrap().as_str(), "zh_Hans");
        assert_eq!(LanguageCode::parse(" en-GB ").unwrap().as_str(), "en_GB");
    }

    #[test]
    fn test_rejects_malformed() {
        for tag in ["", "   ", "f", "french", "fr;DROP", "fr__CA", "\"fr\"", "Base", "position"] {
            assert!(
                matches!(LanguageCode::parse(tag), Err(Error::InvalidLanguageCode(_))),
                "{tag:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_baseline() {
        assert!(LanguageCode::parse("EN").unwrap().is_baseline());
        assert!(!LanguageCode::parse("en_GB").unwrap().is_baseline());
        assert!(LanguageCode::parse("de").unwrap().same_column("DE"));
    }
}
