//! Declared encodings
//!
//! `.strings` files declare their encoding with a byte-order mark (UTF-16 is
//! common for files produced by Xcode); glossaries declare it in the XML
//! declaration. Without a declaration both default to UTF-8.

use encoding_rs::{Encoding, UTF_8};

use crate::error::{Error, Result};

/// Encoding declared by a byte-order mark, and the length of that mark.
#[must_use]
pub fn declared_by_bom(bytes: &[u8]) -> (&'static Encoding, usize) {
    Encoding::for_bom(bytes).unwrap_or((UTF_8, 0))
}

/// Encoding named by an XML declaration (`<?xml ... encoding="..."?>`).
///
/// A byte-order mark takes precedence over the declaration.
#[must_use]
pub fn declared_by_xml(bytes: &[u8]) -> (&'static Encoding, usize) {
    if let Some(found) = Encoding::for_bom(bytes) {
        return found;
    }

    let head = &bytes[..bytes.len().min(256)];
    let Some(end) = head.windows(2).position(|w| w == b"?>") else {
        return (UTF_8, 0);
    };
    let decl = String::from_utf8_lossy(&head[..end]);
    if !decl.trim_start().starts_with("<?xml") {
        return (UTF_8, 0);
    }

    let label = decl.split_once("encoding").and_then(|(_, rest)| {
        let rest = rest.trim_start().strip_prefix('=')?.trim_start();
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        rest[1..].split(quote).next()
    });

    let encoding = label
        .and_then(|l| Encoding::for_label(l.trim().as_bytes()))
        .unwrap_or(UTF_8);
    (encoding, 0)
}

/// Decode `bytes` with `encoding`, skipping `bom_len` leading bytes.
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the bytes are not valid in that encoding.
pub fn decode(bytes: &[u8], encoding: &'static Encoding, bom_len: usize, path: &str) -> Result<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len.min(bytes.len())..])
        .map(std::borrow::Cow::into_owned)
        .ok_or_else(|| Error::Encoding {
            path: path.to_string(),
            encoding: encoding.name(),
        })
}
