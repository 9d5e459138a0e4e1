//! Run report types.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use nbn_model::{RuleAccumulator, RuleSchema, RuleStats, SkipEntry};
use nbn_output::{OutputError, WrittenFile};

/// Outcome of one export run.
#[derive(Debug)]
pub struct RunReport {
    pub input_root: PathBuf,
    pub output_dir: PathBuf,
    /// One entry per rule type, in schema-table order.
    pub tables: Vec<RuleTableSummary>,
    /// Organisation folders that were parsed, in traversal order.
    pub organisations: Vec<OrganisationSummary>,
    /// Organisation folders left out because of the skip set.
    pub skipped_folders: Vec<String>,
    /// `species.csv`, unless it could not be written.
    pub species: Option<WrittenFile>,
    pub species_count: usize,
    /// Rule coverage, when statistics were requested.
    pub stats: Option<RuleStats>,
    /// `stats.csv`, unless statistics were off or the file could not be written.
    pub stats_file: Option<WrittenFile>,
    pub skips: Vec<SkipEntry>,
    /// Files that could not be written under the continue policy.
    pub failures: Vec<OutputError>,
    pub elapsed: Duration,
}

impl RunReport {
    /// Records exported for a rule type.
    #[must_use]
    pub fn record_count(&self, rule_type: &str) -> usize {
        self.table(rule_type).map_or(0, |table| table.records)
    }

    #[must_use]
    pub fn table(&self, rule_type: &str) -> Option<&RuleTableSummary> {
        self.tables.iter().find(|table| table.rule_type == rule_type)
    }

    #[must_use]
    pub fn total_records(&self) -> usize {
        self.tables.iter().map(|table| table.records).sum()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Skip log text, one `[section] - path: reason` line per entry.
    #[must_use]
    pub fn skip_log(&self) -> String {
        self.skips
            .iter()
            .map(|skip| format!("{skip}\n"))
            .collect()
    }
}

/// Export result of one rule type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTableSummary {
    pub rule_type: String,
    pub description: String,
    pub records: usize,
    /// Distinct organisations contributing records.
    pub organisations: usize,
    /// Written CSV file, `None` when writing failed.
    pub path: Option<PathBuf>,
}

impl RuleTableSummary {
    pub(crate) fn new(
        schema: &RuleSchema,
        accumulator: &RuleAccumulator,
        written: Option<&WrittenFile>,
    ) -> Self {
        let records = accumulator.records(&schema.name);
        let organisations: BTreeSet<&str> = records
            .iter()
            .map(|record| record.organisation.as_str())
            .collect();
        Self {
            rule_type: schema.name.clone(),
            description: schema.description.clone(),
            records: records.len(),
            organisations: organisations.len(),
            path: written.map(|file| file.path.clone()),
        }
    }
}

/// Parse counts of one organisation folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganisationSummary {
    pub name: String,
    pub files: usize,
    pub sections: usize,
    pub records: usize,
    pub skipped: usize,
}
