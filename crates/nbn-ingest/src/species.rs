//! Master species list reader.
//!
//! The list is a `#`-delimited text file. Lines starting with `'` are
//! comments and the first remaining line is a header.

use std::path::{Path, PathBuf};

use nbn_model::{SPECIES_COLUMNS, SkipEntry, SkipReason, SpeciesEntry};

use crate::error::{IngestError, Result};
use crate::text::read_text;

/// Default file name of the species list inside the input root.
pub const DEFAULT_SPECIES_LIST: &str = "MasterSpeciesList.txt";

/// Field separator of the species list.
pub const FIELD_SEPARATOR: char = '#';

/// Entries read from a species list plus the lines that were rejected.
#[derive(Debug, Default)]
pub struct SpeciesOutcome {
    pub entries: Vec<SpeciesEntry>,
    pub skips: Vec<SkipEntry>,
}

/// Reads the species list at `path`.
///
/// # Errors
///
/// Returns [`IngestError::FileNotFound`] when the file does not exist and
/// [`IngestError::FileRead`] when it cannot be read. Malformed lines are
/// reported as skips.
pub fn read_species_list(path: &Path) -> Result<SpeciesOutcome> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = read_text(path)?;
    let outcome = parse_species_list(&text, path);
    tracing::debug!(
        path = %path.display(),
        entries = outcome.entries.len(),
        skipped = outcome.skips.len(),
        "read species list"
    );
    Ok(outcome)
}

/// Parses species list text; `path` is only used to label skips.
#[must_use]
pub fn parse_species_list(text: &str, path: &Path) -> SpeciesOutcome {
    let mut outcome = SpeciesOutcome::default();
    let mut header_seen = false;

    for (index, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.starts_with('\'') || line.trim().is_empty() {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }

        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        match SpeciesEntry::from_fields(&fields) {
            Some(entry) => outcome.entries.push(entry),
            None => outcome.skips.push(SkipEntry::new(
                PathBuf::from(path),
                format!("line {}", index + 1),
                SkipReason::MalformedSpeciesLine {
                    expected: SPECIES_COLUMNS.len(),
                    found: fields.len(),
                },
            )),
        }
    }
    outcome
}
