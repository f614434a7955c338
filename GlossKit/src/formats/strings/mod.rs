//! `.strings` resource files
//!
//! ```text
//! /* Title of the confirmation button */
//! "OK" = "Valider";
//! // Cancel button
//! "Cancel" = "Annuler";
//! ```
//!
//! The comment right before a statement becomes the record's description.
//! Quoted strings understand `\"`, `\\`, `\'`, `\n`, `\t`, `\r`, `\0` and
//! `\uXXXX` escapes. When a position repeats, the last statement wins.

mod parser;

use encoding_rs::Encoding;

use super::encoding;
use super::LocalizedFile;
use crate::error::Result;
use parser::Parser;

/// Parse `.strings` bytes, taking the declared encoding from the byte-order mark.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the bytes are not valid in the declared encoding.
///
/// [`Error::Encoding`]: crate::Error::Encoding
pub fn parse_strings_bytes(bytes: &[u8], project: &str, path: &str) -> Result<LocalizedFile> {
    let (declared, bom_len) = encoding::declared_by_bom(bytes);
    let text = encoding::decode(bytes, declared, bom_len, path)?;
    Ok(parse_strings_str(&text, project, path))
}

/// Parse `.strings` bytes in an explicitly declared encoding.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the bytes are not valid in `declared`.
///
/// [`Error::Encoding`]: crate::Error::Encoding
pub fn parse_strings(
    bytes: &[u8],
    declared: &'static Encoding,
    project: &str,
    path: &str,
) -> Result<LocalizedFile> {
    let text = encoding::decode(bytes, declared, 0, path)?;
    Ok(parse_strings_str(&text, project, path))
}

/// Parse already-decoded `.strings` text. Never fails; malformed statements
/// end up in the file's diagnostics.
#[must_use]
pub fn parse_strings_str(text: &str, project: &str, path: &str) -> LocalizedFile {
    let mut file = LocalizedFile::new(project, path);
    Parser::new(text, &mut file).run();
    file
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::formats::{DiagnosticKind, Record};
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> LocalizedFile {
        parse_strings_str(text, "App", "App/Foo.strings")
    }

    #[test]
    fn test_basic_statements() {
        let file = parse("\"OK\" = \"Valider\";\n\"Cancel\" = \"Annuler\";\n");
        assert_eq!(
            file.records,
            vec![
                Record::new("OK", None, "Valider"),
                Record::new("Cancel", None, "Annuler"),
            ]
        );
        assert!(file.diagnostics.is_empty());
    }

    #[test]
    fn test_comment_becomes_description() {
        let text = "/* Confirm button */\n\"OK\" = \"OK\";\n\n\"Plain\" = \"x\";\n// Line comment\n\"Next\" = \"y\";";
        let file = parse(text);
        assert_eq!(file.records[0].description.as_deref(), Some("Confirm button"));
        assert_eq!(file.records[1].description, None);
        assert_eq!(file.records[2].description.as_deref(), Some("Line comment"));
    }

    #[test]
    fn test_blank_comment_is_no_description() {
        let file = parse("/* */\n\"OK\" = \"OK\";");
        assert_eq!(file.records[0].description, None);
    }

    #[test]
    fn test_escapes() {
        let file = parse(r#""k" = "Say \"hi\"\n\tto \\ them é \U0041 \q";"#);
        assert_eq!(file.records[0].value.as_deref(), Some("Say \"hi\"\n\tto \\ them \u{e9} A q"));
    }

    #[test]
    fn test_surrogate_pair_escape() {
        let file = parse(r#""smile" = "\UD83D\UDE00";"#);
        assert_eq!(file.records[0].value.as_deref(), Some("\u{1F600}"));
    }

    #[test]
    fn test_bare_keys_and_multiline_values() {
        let file = parse("NSCameraUsageDescription = \"Scan\nreceipts\";");
        assert_eq!(file.records, vec![Record::new("NSCameraUsageDescription", None, "Scan\nreceipts")]);
    }

    #[test]
    fn test_malformed_statement_skipped() {
        let text = "\"OK\" = \"OK\";\n\"Cancel\" \"Cancel\";\n\"Done\" = \"Done\";\n";
        let file = parse(text);
        let positions: Vec<_> = file.records.iter().map(|r| r.position.as_str()).collect();
        assert_eq!(positions, vec!["OK", "Done"]);
        assert_eq!(file.diagnostics.len(), 1);
        let diag = &file.diagnostics[0];
        assert_eq!(diag.kind, DiagnosticKind::MalformedRecord);
        assert_eq!(diag.line, Some(2));
        assert_eq!(diag.position.as_deref(), Some("Cancel"));
        assert_eq!(diag.path, "App/Foo.strings");
    }

    #[test]
    fn test_missing_semicolon_resumes_on_next_line() {
        let file = parse("\"A\" = \"a\"\n\"B\" = \"b\";\n");
        assert_eq!(file.records, vec![Record::new("B", None, "b")]);
        assert_eq!(file.diagnostics.len(), 1);
        assert_eq!(file.diagnostics[0].position.as_deref(), Some("A"));
    }

    #[test]
    fn test_unterminated_string() {
        let file = parse("\"A\" = \"a\";\n\"B\" = \"never closed;\n");
        assert_eq!(file.records, vec![Record::new("A", None, "a")]);
        assert_eq!(file.diagnostics.len(), 1);
        assert_eq!(file.diagnostics[0].line, Some(2));
    }

    #[test]
    fn test_unterminated_comment_keeps_later_statements() {
        let file = parse("\"A\" = \"a\";\n/* never closed\n\"B\" = \"b\";\n\"C\" = \"c\";\n");
        let positions: Vec<_> = file.records.iter().map(|r| r.position.as_str()).collect();
        assert_eq!(positions, vec!["A", "B", "C"]);
        assert_eq!(file.diagnostics.len(), 1);
        assert_eq!(file.diagnostics[0].kind, DiagnosticKind::MalformedRecord);
        assert_eq!(file.diagnostics[0].line, Some(2));
    }

    #[test]
    fn test_trailing_comment_is_not_next_description() {
        let file = parse("\"A\" = \"a\"; // note about A\n\"B\" = \"b\"; /* about B */\n/* C */\n\"C\" = \"c\";");
        assert_eq!(
            file.records,
            vec![
                Record::new("A", None, "a"),
                Record::new("B", None, "b"),
                Record::new("C", Some("C".to_string()), "c"),
            ]
        );
        assert!(file.diagnostics.is_empty());
    }

    #[test]
    fn test_duplicate_position_last_wins() {
        let text = "/* first */\n\"A\" = \"1\";\n\"B\" = \"2\";\n/* second */\n\"A\" = \"3\";\n";
        let file = parse(text);
        assert_eq!(
            file.records,
            vec![
                Record::new("A", Some("second".to_string()), "3"),
                Record::new("B", None, "2"),
            ]
        );
        assert_eq!(file.diagnostics.len(), 1);
        assert_eq!(file.diagnostics[0].kind, DiagnosticKind::DuplicatePosition);
    }

    #[test]
    fn test_empty_and_comment_only() {
        assert!(parse("").records.is_empty());
        let file = parse("/* nothing to see */\n// here\n");
        assert!(file.records.is_empty());
        assert!(file.diagnostics.is_empty());
    }

    #[test]
    fn test_utf16_with_bom() {
        let text = "\"OK\" = \"Bestätigen\";";
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let file = parse_strings_bytes(&bytes, "App", "App/Foo.strings").unwrap();
        assert_eq!(file.records, vec![Record::new("OK", None, "Bestätigen")]);
    }

    #[test]
    fn test_undecodable_bytes() {
        let err = parse_strings_bytes(b"\"OK\" = \"\xFF\xFF\";", "App", "App/Foo.strings").unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn test_explicit_encoding() {
        let file = parse_strings(b"\"OK\" = \"D\xE9j\xE0\";", encoding_rs::WINDOWS_1252, "App", "App/Foo.strings").unwrap();
        assert_eq!(file.records[0].value.as_deref(), Some("Déjà"));
    }
}
