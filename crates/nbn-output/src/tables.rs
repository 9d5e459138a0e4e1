//! CSV writers for rule tables, the species list and rule statistics.
//!
//! Files are UTF-8 and every row ends with a bare carriage return, the
//! layout NBN Record Cleaner imports. Non-numeric fields are quoted.
//! Existing files are overwritten.

use std::fs::{self, File};
use std::path::Path;

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use tracing::{debug, info_span, warn};

use nbn_model::{
    RuleAccumulator, RuleRecord, RuleSchema, RuleStats, SPECIES_COLUMNS, SPECIES_TABLE,
    STATS_COLUMNS, STATS_TABLE, SchemaTable, SpeciesEntry,
};

use crate::error::{OutputError, Result};
use crate::types::{WritePolicy, WriteReport, WrittenFile};

/// Checks that `dir` exists, is a directory and is writable.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    let metadata = fs::metadata(dir).map_err(|_| OutputError::OutputDirNotFound {
        path: dir.to_path_buf(),
    })?;
    if !metadata.is_dir() {
        return Err(OutputError::OutputDirNotDirectory {
            path: dir.to_path_buf(),
        });
    }
    if metadata.permissions().readonly() {
        return Err(OutputError::OutputDirReadOnly {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Writes one CSV file per rule type in schema-table order.
///
/// Rule types without records get a header-only file.
///
/// # Errors
///
/// Returns the output directory error if `output_dir` is unusable, and the
/// first per-file error under [`WritePolicy::Abort`]. Under
/// [`WritePolicy::Continue`] per-file errors are collected in the report.
pub fn write_rule_tables(
    accumulator: &RuleAccumulator,
    schemas: &SchemaTable,
    output_dir: &Path,
    policy: WritePolicy,
) -> Result<WriteReport> {
    ensure_output_dir(output_dir)?;
    let span = info_span!("write", dir = %output_dir.display(), %policy);
    let _guard = span.enter();

    let mut report = WriteReport::default();
    for schema in schemas {
        let records = accumulator.records(&schema.name);
        match write_rule_table(schema, records, output_dir) {
            Ok(file) => report.written.push(file),
            Err(err) if policy == WritePolicy::Abort => return Err(err),
            Err(err) => {
                warn!(rule_type = %schema.name, error = %err, "rule table not written");
                report.failures.push(err);
            }
        }
    }
    Ok(report)
}

/// Writes `<rule type>.csv` with the schema's columns as header.
pub fn write_rule_table(
    schema: &RuleSchema,
    records: &[RuleRecord],
    output_dir: &Path,
) -> Result<WrittenFile> {
    let path = output_dir.join(schema.file_name());
    let header: Vec<&str> = schema.column_names().collect();
    let rows = records
        .iter()
        .map(|record| header.iter().map(|column| record.cell(column)).collect());
    write_table(&path, &header, rows)?;

    debug!(rule_type = %schema.name, path = %path.display(), records = records.len(), "wrote rule table");
    Ok(WrittenFile {
        rule_type: schema.name.clone(),
        path,
        records: records.len(),
    })
}

/// Writes `species.csv` with the fixed species columns.
pub fn write_species_list(entries: &[SpeciesEntry], output_dir: &Path) -> Result<WrittenFile> {
    ensure_output_dir(output_dir)?;
    let path = output_dir.join(format!("{SPECIES_TABLE}.csv"));
    let rows = entries
        .iter()
        .map(|entry| entry.values().map(str::to_string).to_vec());
    write_table(&path, &SPECIES_COLUMNS, rows)?;

    debug!(path = %path.display(), records = entries.len(), "wrote species list");
    Ok(WrittenFile {
        rule_type: SPECIES_TABLE.to_string(),
        path,
        records: entries.len(),
    })
}

/// Writes `stats.csv`: one row per species list taxon with its rule totals
/// and a count column per rule type.
pub fn write_stats(stats: &RuleStats, output_dir: &Path) -> Result<WrittenFile> {
    ensure_output_dir(output_dir)?;
    let path = output_dir.join(format!("{STATS_TABLE}.csv"));
    let header: Vec<&str> = STATS_COLUMNS
        .iter()
        .copied()
        .chain(stats.rule_types.iter().map(String::as_str))
        .collect();
    let rows = stats.taxa.iter().map(|taxon| {
        let mut row = vec![
            taxon.taxon_key.clone(),
            taxon.preferred_tvk.clone(),
            taxon.rules_total().to_string(),
            taxon.rules_own().to_string(),
            taxon.rules_preferred.to_string(),
        ];
        row.extend(taxon.by_type.iter().map(ToString::to_string));
        row
    });
    write_table(&path, &header, rows)?;

    debug!(path = %path.display(), taxa = stats.taxa.len(), "wrote rule statistics");
    Ok(WrittenFile {
        rule_type: STATS_TABLE.to_string(),
        path,
        records: stats.taxa.len(),
    })
}

fn write_table(
    path: &Path,
    header: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<()> {
    let file_error = |source: csv::Error| OutputError::FileAccess {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv_writer(path).map_err(file_error)?;
    writer.write_record(header).map_err(file_error)?;
    for row in rows {
        writer.write_record(&row).map_err(file_error)?;
    }
    writer
        .flush()
        .map_err(|err| file_error(csv::Error::from(err)))?;
    Ok(())
}

fn csv_writer(path: &Path) -> csv::Result<Writer<File>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .terminator(Terminator::Any(b'\r'))
        .from_path(path)
}
