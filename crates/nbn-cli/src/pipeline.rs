//! Rule export pipeline.
//!
//! The controller checks both directories, parses every organisation folder
//! under the input root, merges the records and writes one CSV per rule
//! type followed by the species list and, when enabled, rule statistics.

use std::path::Path;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, info_span, warn};

use nbn_ingest::{IngestError, RuleParser, folder_name, list_subdirectories, read_species_list};
use nbn_model::{RuleAccumulator, RuleStats, SchemaTable, SkipEntry, SkipReason, SpeciesEntry};
use nbn_output::{
    OutputError, WritePolicy, WrittenFile, ensure_output_dir, write_rule_tables,
    write_species_list, write_stats,
};

use crate::config::RunConfig;
use crate::error::RunError;
use crate::types::{OrganisationSummary, RuleTableSummary, RunReport};

const PROGRESS_TEMPLATE: &str = "{spinner} [{bar:30}] {pos}/{len} {msg}";

/// Runs one export from an input root to an output directory.
pub struct RuleController {
    config: RunConfig,
    schemas: SchemaTable,
    progress: ProgressBar,
}

impl RuleController {
    /// Builds a controller, validating the configured rule types.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Config`] for invalid settings.
    pub fn new(config: RunConfig) -> Result<Self, RunError> {
        config.validate()?;
        let schemas = config.schema_table()?;
        Ok(Self {
            config,
            schemas,
            progress: ProgressBar::hidden(),
        })
    }

    /// Reports organisation progress on `progress` (hidden by default).
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
            progress.set_style(style);
        }
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    #[must_use]
    pub fn schemas(&self) -> &SchemaTable {
        &self.schemas
    }

    /// Exports every rule under `input_root` to `output_dir`.
    ///
    /// Existing CSV files in `output_dir` are overwritten.
    ///
    /// # Errors
    ///
    /// - [`RunError::Input`] when `input_root` cannot be listed.
    /// - [`RunError::Output`] when `output_dir` is unusable.
    /// - [`RunError::WriteAborted`] when a file fails under the abort policy.
    ///
    /// Both directories are checked before anything is parsed or written.
    pub fn run(&self, input_root: &Path, output_dir: &Path) -> Result<RunReport, RunError> {
        let start = Instant::now();
        let span = info_span!(
            "run",
            input = %input_root.display(),
            output = %output_dir.display()
        );
        let _guard = span.enter();

        let folders =
            list_subdirectories(input_root).map_err(|source| RunError::Input { source })?;
        ensure_output_dir(output_dir).map_err(|source| RunError::Output { source })?;

        let parser = RuleParser::new(&self.schemas).with_options(self.config.parser_options());
        let mut accumulator = RuleAccumulator::seeded(&self.schemas);
        let mut organisations = Vec::new();
        let mut skipped_folders = Vec::new();
        let mut skips = Vec::new();

        self.progress.set_length(folders.len() as u64);
        for folder in &folders {
            let name = folder_name(folder).unwrap_or_default().to_string();
            self.progress.set_message(name.clone());
            if self.config.skip_folders.contains(&name) {
                info!(folder = %name, "skipping folder");
                skipped_folders.push(name);
                self.progress.inc(1);
                continue;
            }

            let org_span = info_span!("organisation", name = %name);
            let _org_guard = org_span.enter();
            match parser.parse(folder) {
                Ok(outcome) => {
                    info!(
                        files = outcome.files_read,
                        records = outcome.record_count(),
                        skipped = outcome.skips.len(),
                        "parsed organisation"
                    );
                    log_skips(&outcome.skips);
                    organisations.push(OrganisationSummary {
                        name,
                        files: outcome.files_read,
                        sections: outcome.sections_read,
                        records: outcome.record_count(),
                        skipped: outcome.skips.len(),
                    });
                    accumulator.merge(outcome.accumulator);
                    skips.extend(outcome.skips);
                }
                Err(err) => {
                    let skip = unreadable_folder(folder, &err);
                    log_skips(std::slice::from_ref(&skip));
                    skips.push(skip);
                }
            }
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();

        let policy = self.config.write_policy;
        let written = write_rule_tables(&accumulator, &self.schemas, output_dir, policy)
            .map_err(RunError::from_output)?;
        let tables = self
            .schemas
            .iter()
            .map(|schema| RuleTableSummary::new(schema, &accumulator, written.file(&schema.name)))
            .collect();
        let mut failures = written.failures;

        let species_entries = self.read_species(input_root, &mut skips);
        let species = keep_going(
            write_species_list(&species_entries, output_dir),
            policy,
            &mut failures,
        )?;

        let (stats, stats_file) = if self.config.stats {
            let stats = RuleStats::compute(&self.schemas, &accumulator, &species_entries);
            log_stats(&stats);
            let file = keep_going(write_stats(&stats, output_dir), policy, &mut failures)?;
            (Some(stats), file)
        } else {
            (None, None)
        };

        let report = RunReport {
            input_root: input_root.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            tables,
            organisations,
            skipped_folders,
            species,
            species_count: species_entries.len(),
            stats,
            stats_file,
            skips,
            failures,
            elapsed: start.elapsed(),
        };
        info!(
            records = report.total_records(),
            species = report.species_count,
            skipped = report.skips.len(),
            failures = report.failures.len(),
            duration_ms = report.elapsed.as_millis(),
            "export complete"
        );
        Ok(report)
    }

    /// Reads the species list; a missing list exports no species.
    fn read_species(&self, input_root: &Path, skips: &mut Vec<SkipEntry>) -> Vec<SpeciesEntry> {
        let path = self.config.species_list_path(input_root);
        match read_species_list(&path) {
            Ok(outcome) => {
                log_skips(&outcome.skips);
                skips.extend(outcome.skips);
                outcome.entries
            }
            Err(IngestError::FileNotFound { path }) => {
                warn!(path = %path.display(), "species list not found");
                Vec::new()
            }
            Err(err) => {
                let skip = SkipEntry::file(
                    &path,
                    SkipReason::Unreadable {
                        message: err.to_string(),
                    },
                );
                log_skips(std::slice::from_ref(&skip));
                skips.push(skip);
                Vec::new()
            }
        }
    }
}

/// Keeps a failed extra export under the continue policy.
fn keep_going(
    result: Result<WrittenFile, OutputError>,
    policy: WritePolicy,
    failures: &mut Vec<OutputError>,
) -> Result<Option<WrittenFile>, RunError> {
    match result {
        Ok(file) => Ok(Some(file)),
        Err(err) if policy == WritePolicy::Abort || err.is_fatal() => {
            Err(RunError::from_output(err))
        }
        Err(err) => {
            warn!(error = %err, "file not written");
            failures.push(err);
            Ok(None)
        }
    }
}

fn log_stats(stats: &RuleStats) {
    for key in &stats.orphan_taxa {
        debug!(taxon_key = %key, "rules for a taxon missing from the species list");
    }
    for key in &stats.unknown_preferred {
        warn!(taxon_key = %key, "preferred taxon key missing from the species list");
    }
    info!(
        taxa = stats.taxa.len(),
        rules = stats.total_rules(),
        taxa_with_rules = stats.taxa_with_rules,
        orphan_rules = stats.orphan_rules,
        "computed rule statistics"
    );
}

fn unreadable_folder(folder: &Path, err: &IngestError) -> SkipEntry {
    SkipEntry::file(
        folder,
        SkipReason::Unreadable {
            message: err.to_string(),
        },
    )
}

fn log_skips(skips: &[SkipEntry]) {
    for skip in skips {
        warn!(
            path = %skip.path.display(),
            section = %skip.section,
            reason = %skip.reason,
            "skipped"
        );
    }
}
