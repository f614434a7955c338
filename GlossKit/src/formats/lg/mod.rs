//! `.lg` localization glossaries
//!
//! XML files bundling every localized file of one project:
//!
//! ```xml
//! <Proj>
//!   <ProjName>Calculator</ProjName>
//!   <File>
//!     <Filepath>Calculator/Localizable.strings</Filepath>
//!     <TextItem>
//!       <Description>Confirm button</Description>
//!       <Position>OK</Position>
//!       <TranslationSet>
//!         <base loc="en" origin="UI">OK</base>
//!         <tran loc="fr" origin="UI">Valider</tran>
//!       </TranslationSet>
//!     </TextItem>
//!   </File>
//! </Proj>
//! ```
//!
//! The glossary's language is the `loc` of its first `<tran>`. Every text
//! item becomes a [`Record`] carrying the `<base>` text as its baseline.
//!
//! [`Record`]: crate::formats::Record

mod reader;

use super::encoding;
use super::{Diagnostic, LocalizedFile};
use crate::error::Result;

/// A parsed glossary.
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    /// `ProjName`, or the fallback given by the caller
    pub project: String,
    /// Normalized `loc` of the first `<tran>`
    pub language: Option<String>,
    pub files: Vec<LocalizedFile>,
    /// Problems that skipped whole `<File>` elements
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse glossary bytes, honouring the encoding in the XML declaration.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the bytes do not decode in the declared
/// encoding, or [`Error::Xml`] if the XML is not well-formed.
///
/// [`Error::Encoding`]: crate::Error::Encoding
/// [`Error::Xml`]: crate::Error::Xml
pub fn parse_glossary(bytes: &[u8], project_fallback: &str, path: &str) -> Result<Glossary> {
    let (declared, bom_len) = encoding::declared_by_xml(bytes);
    let text = encoding::decode(bytes, declared, bom_len, path)?;
    parse_glossary_str(&text, project_fallback, path)
}

/// Parse already-decoded glossary XML.
///
/// # Errors
///
/// Returns [`Error::Xml`] if the XML is not well-formed.
///
/// [`Error::Xml`]: crate::Error::Xml
pub fn parse_glossary_str(text: &str, project_fallback: &str, path: &str) -> Result<Glossary> {
    reader::read_glossary(text, project_fallback, path)
}

/// Read only as far as the first `<tran>` and return its normalized language.
///
/// # Errors
///
/// Returns [`Error::Encoding`] or [`Error::Xml`] when the glossary is unreadable
/// before the first translation.
///
/// [`Error::Encoding`]: crate::Error::Encoding
/// [`Error::Xml`]: crate::Error::Xml
pub fn glossary_language(bytes: &[u8], path: &str) -> Result<Option<String>> {
    let (declared, bom_len) = encoding::declared_by_xml(bytes);
    let text = encoding::decode(bytes, declared, bom_len, path)?;
    reader::first_translation_language(&text)
}
