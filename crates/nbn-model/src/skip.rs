//! Diagnostics for sections and files that did not become records.

use std::fmt;
use std::path::{Path, PathBuf};

/// Section identifier used when a whole file is skipped.
pub const WHOLE_FILE: &str = "*";

/// Why a section, entry or file was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Section name does not select any rule type.
    UnrecognizedRuleType,
    /// Section not consumed by the folder rule type of its file.
    UnrecognizedSection { rule_type: String },
    MissingRequiredField { field: String },
    MissingRequiredSection { section: String },
    InvalidValue { field: String, message: String },
    UnexpectedTestType { expected: String, found: String },
    MismatchedStageLists {
        stages: usize,
        start_dates: usize,
        end_dates: usize,
    },
    /// INI syntax error.
    Malformed { message: String },
    /// The file or folder could not be read.
    Unreadable { message: String },
    MalformedSpeciesLine { expected: usize, found: usize },
}

impl SkipReason {
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    #[must_use]
    pub fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingRequiredField { .. })
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedRuleType => f.write_str("unrecognized rule type"),
            Self::UnrecognizedSection { rule_type } => {
                write!(f, "unrecognized section for {rule_type} rules")
            }
            Self::MissingRequiredField { field } => {
                write!(f, "missing required field '{field}'")
            }
            Self::MissingRequiredSection { section } => {
                write!(f, "missing required section [{section}]")
            }
            Self::InvalidValue { field, message } => {
                write!(f, "invalid value for '{field}': {message}")
            }
            Self::UnexpectedTestType { expected, found } => {
                write!(f, "unexpected test type '{found}' (expected '{expected}')")
            }
            Self::MismatchedStageLists {
                stages,
                start_dates,
                end_dates,
            } => write!(
                f,
                "mismatched stage lists ({stages} stages, {start_dates} start dates, {end_dates} end dates)"
            ),
            Self::Malformed { message } => write!(f, "parse error: {message}"),
            Self::Unreadable { message } => write!(f, "unreadable: {message}"),
            Self::MalformedSpeciesLine { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
        }
    }
}

/// One entry of the skip log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipEntry {
    pub path: PathBuf,
    pub section: String,
    pub reason: SkipReason,
}

impl SkipEntry {
    pub fn new(path: impl Into<PathBuf>, section: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            section: section.into(),
            reason,
        }
    }

    /// Skip covering an entire file.
    pub fn file(path: &Path, reason: SkipReason) -> Self {
        Self::new(path, WHOLE_FILE, reason)
    }
}

/// Formats as a skip log line: `[section] - path: reason`.
impl fmt::Display for SkipEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] - {}: {}",
            self.section,
            self.path.display(),
            self.reason
        )
    }
}
