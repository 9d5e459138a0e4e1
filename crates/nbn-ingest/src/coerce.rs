//! Typed conversion of raw INI strings into field values.
//!
//! One function per [`FieldKind`]. Each returns a `Result` so a bad value
//! turns into a skip entry for its section instead of aborting the run.
//! Empty input always converts to [`FieldValue::Empty`].

use chrono::NaiveDate;
use thiserror::Error;

use nbn_model::{FieldKind, FieldValue};

/// Date layouts accepted for `date` columns, tried in order.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y%m%d"];

/// Separators accepted between items of a `list` column.
pub const LIST_SEPARATORS: [char; 3] = [';', ',', '\n'];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoerceError {
    #[error("'{value}' is not a number")]
    NotANumber { value: String },

    #[error("'{value}' is not a finite number")]
    NotFinite { value: String },

    #[error("'{value}' is not a date (expected YYYY-MM-DD, DD/MM/YYYY or YYYYMMDD)")]
    NotADate { value: String },
}

/// Converts `raw` according to `kind`.
pub fn coerce(kind: FieldKind, raw: &str) -> Result<FieldValue, CoerceError> {
    match kind {
        FieldKind::Text => Ok(parse_text(raw)),
        FieldKind::Number => parse_number(raw),
        FieldKind::Date => parse_date(raw),
        FieldKind::List => Ok(parse_list(raw)),
    }
}

#[must_use]
pub fn parse_text(raw: &str) -> FieldValue {
    FieldValue::from(raw.trim())
}

pub fn parse_number(raw: &str) -> Result<FieldValue, CoerceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(FieldValue::Empty);
    }
    let number: f64 = trimmed.parse().map_err(|_| CoerceError::NotANumber {
        value: trimmed.to_string(),
    })?;
    if !number.is_finite() {
        return Err(CoerceError::NotFinite {
            value: trimmed.to_string(),
        });
    }
    Ok(FieldValue::Number(number))
}

pub fn parse_date(raw: &str) -> Result<FieldValue, CoerceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(FieldValue::Empty);
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(FieldValue::Date)
        .ok_or_else(|| CoerceError::NotADate {
            value: trimmed.to_string(),
        })
}

#[must_use]
pub fn parse_list(raw: &str) -> FieldValue {
    let items: Vec<String> = raw
        .split(LIST_SEPARATORS)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        FieldValue::Empty
    } else {
        FieldValue::List(items)
    }
}
