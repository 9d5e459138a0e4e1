//! Text decoding and string cleanup helpers.

use std::path::Path;

use encoding_rs::{UTF_8, WINDOWS_1252};

use crate::error::{IngestError, Result};

/// Decodes file bytes as UTF-8 (dropping a BOM), falling back to
/// Windows-1252 for legacy rule files.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if !had_errors {
        return text.into_owned();
    }
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.into_owned()
}

/// Reads and decodes a whole text file.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode_text(&bytes))
}

/// Splits a multi-line value into trimmed, non-empty lines.
pub fn split_lines(value: &str) -> impl Iterator<Item = &str> {
    value.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Trims a value and collapses runs of blank lines.
#[must_use]
pub fn clean_value(value: &str) -> String {
    split_lines(value).collect::<Vec<_>>().join("\n")
}
