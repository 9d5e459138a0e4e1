//! Output-related types for the rule export.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::OutputError;

/// What to do when one CSV file cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Record the failure and keep writing the other files.
    #[default]
    Continue,
    /// Stop at the first failure.
    Abort,
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => f.write_str("continue"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

/// A CSV file that was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Rule type, or `species` / `stats` for the extra exports.
    pub rule_type: String,
    pub path: PathBuf,
    /// Data rows, excluding the header.
    pub records: usize,
}

/// Files written by one call to `write_rule_tables`.
#[derive(Debug, Default)]
pub struct WriteReport {
    pub written: Vec<WrittenFile>,
    /// Per-file failures kept under [`WritePolicy::Continue`].
    pub failures: Vec<OutputError>,
}

impl WriteReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Written file of a rule type, if it succeeded.
    #[must_use]
    pub fn file(&self, rule_type: &str) -> Option<&WrittenFile> {
        self.written.iter().find(|file| file.rule_type == rule_type)
    }

    /// Total data rows across all written files.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.written.iter().map(|file| file.records).sum()
    }
}
