use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::schema::ORGANISATION_COLUMN;

/// Typed value of one rule column.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    List(Vec<String>),
}

impl FieldValue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Number(_) | Self::Date(_) => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }
}

/// Renders the value the way it appears in the CSV export.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::List(items) => f.write_str(&items.join(";")),
        }
    }
}

/// One parsed rule, tagged with its type, organisation and source file.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleRecord {
    pub rule_type: String,
    pub organisation: String,
    pub source: PathBuf,
    pub values: BTreeMap<String, FieldValue>,
}

impl RuleRecord {
    pub fn new(
        rule_type: impl Into<String>,
        organisation: impl Into<String>,
        source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rule_type: rule_type.into(),
            organisation: organisation.into(),
            source: source.into(),
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    #[must_use]
    pub fn value(&self, column: &str) -> Option<&FieldValue> {
        self.values.get(column)
    }

    /// Text of a column as written to CSV; the organisation column comes
    /// from the record itself.
    #[must_use]
    pub fn cell(&self, column: &str) -> String {
        if column == ORGANISATION_COLUMN {
            return self.organisation.clone();
        }
        self.values
            .get(column)
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}
