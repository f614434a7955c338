//! Language registry
//!
//! Tracks which language columns exist and adds new ones on demand.

use glosskit::locale::{BASELINE, LanguageCode};

use crate::error::Result;
use crate::store::Store;

/// Known language codes, seeded from the store's columns.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    known: Vec<String>,
}

impl LanguageRegistry {
    /// Read the language columns the store already has.
    pub fn load(store: &Store) -> Result<Self> {
        let mut known = store.language_columns()?;
        if !known.iter().any(|column| column.eq_ignore_ascii_case(BASELINE)) {
            known.insert(0, BASELINE.to_string());
        }
        Ok(Self { known })
    }

    /// Known languages, baseline first, in column order.
    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.known
    }

    /// Whether a language already has a column (case-insensitive).
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.known.iter().any(|known| known.eq_ignore_ascii_case(code))
    }

    /// Validate a language tag and make sure its column exists.
    ///
    /// Idempotent: a known language (in any letter case) adds nothing.
    ///
    /// # Errors
    ///
    /// Returns [`glosskit::Error::InvalidLanguageCode`] (wrapped) for a
    /// malformed tag, and [`Error::Store`] if the column cannot be added.
    ///
    /// [`Error::Store`]: crate::Error::Store
    pub fn ensure_language(&mut self, store: &Store, tag: &str) -> Result<LanguageCode> {
        let code = LanguageCode::parse(tag)?;
        if self.contains(code.as_str()) {
            return Ok(code);
        }

        if store.add_language_column(&code)? {
            tracing::info!("Added language column {}", code);
        }
        self.known.push(code.as_str().to_string());
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ensure_language_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let mut registry = LanguageRegistry::load(&store).unwrap();
        assert_eq!(registry.languages(), ["en"]);

        let fr = registry.ensure_language(&store, "fr").unwrap();
        assert_eq!(fr.as_str(), "fr");
        registry.ensure_language(&store, "fr").unwrap();
        registry.ensure_language(&store, "FR").unwrap();
        registry.ensure_language(&store, "en").unwrap();

        assert_eq!(registry.languages(), ["en", "fr"]);
        assert_eq!(store.language_columns().unwrap(), vec!["en", "fr"]);
    }

    #[test]
    fn test_seeded_from_store() {
        let store = Store::open_in_memory().unwrap();
        store.add_language_column(&LanguageCode::parse("pt-BR").unwrap()).unwrap();

        let mut registry = LanguageRegistry::load(&store).unwrap();
        assert!(registry.contains("pt_br"));
        registry.ensure_language(&store, "pt_BR").unwrap();
        assert_eq!(store.language_columns().unwrap(), vec!["en", "pt_BR"]);
    }

    #[test]
    fn test_invalid_codes_add_nothing() {
        let store = Store::open_in_memory().unwrap();
        let mut registry = LanguageRegistry::load(&store).unwrap();
        for tag in ["", "French Localizations", "fr\"; DROP TABLE Files; --", "position"] {
            let err = registry.ensure_language(&store, tag).unwrap_err();
            assert!(matches!(err, Error::Kit(glosskit::Error::InvalidLanguageCode(_))));
        }
        assert_eq!(store.language_columns().unwrap(), vec!["en"]);
    }
}
