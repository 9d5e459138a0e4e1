//! NBN Record Cleaner folder layouts.
//!
//! Every file carries a `[Metadata]` block whose `TestType` must match the
//! folder's rule type. The remaining sections depend on the format.

use nbn_model::{FieldValue, FolderFormat, FolderRule, RuleSchema, SkipReason};

use super::{FileContext, FileOutcome};
use crate::ini::{IniDocument, IniOptions, IniSection};
use crate::text::{clean_value, split_lines};

const METADATA: &str = "Metadata";
const END_METADATA: &str = "EndMetadata";
const INI: &str = "INI";
const DATA: &str = "Data";

/// Skip that drops the rest of the file, with the section it refers to.
type Dropped = (&'static str, SkipReason);

/// A folder-layout file being converted into records of one rule type.
struct FolderFile<'c, 'p> {
    context: &'c FileContext<'p>,
    schema: &'c RuleSchema,
}

impl FolderFile<'_, '_> {
    /// Builds one record, or records a skip for `section` when a required
    /// column is empty.
    fn push(&self, outcome: &mut FileOutcome, section: &str, values: Vec<(&str, FieldValue)>) {
        match self.context.record(self.schema, values) {
            Ok(record) => outcome.records.push(record),
            Err(reason) => outcome.skip(self.context.path, section, reason),
        }
    }
}

pub(super) fn parse_folder_file(
    context: &FileContext<'_>,
    schema: &RuleSchema,
    rule: &FolderRule,
    text: &str,
    outcome: &mut FileOutcome,
) {
    let options = if rule.format.list_style() {
        IniOptions::LIST_STYLE
    } else {
        IniOptions::STANDARD
    };
    let document = match IniDocument::parse(text, options) {
        Ok(document) => document,
        Err(err) => {
            outcome.skip_file(
                context.path,
                SkipReason::Malformed {
                    message: err.to_string(),
                },
            );
            return;
        }
    };
    outcome.sections += document.len();

    for name in document.section_names() {
        if !is_structural(rule.format, name) {
            outcome.skip(
                context.path,
                name,
                SkipReason::UnrecognizedSection {
                    rule_type: schema.name.clone(),
                },
            );
        }
    }

    let file = FolderFile { context, schema };
    if let Err((section, reason)) = convert(&file, rule, &document, outcome) {
        outcome.skip(context.path, section, reason);
    }
}

fn convert(
    file: &FolderFile<'_, '_>,
    rule: &FolderRule,
    document: &IniDocument,
    outcome: &mut FileOutcome,
) -> Result<(), Dropped> {
    let metadata = required_section(document, METADATA)?;
    let found = metadata.get("TestType").unwrap_or_default();
    if !found.eq_ignore_ascii_case(&rule.test_type) {
        return Err((
            METADATA,
            SkipReason::UnexpectedTestType {
                expected: rule.test_type.clone(),
                found: found.to_string(),
            },
        ));
    }

    match rule.format {
        FolderFormat::Additional => additional(file, document, metadata, outcome),
        FolderFormat::Difficulty => difficulty(file, document, outcome),
        FolderFormat::Period => period(file, document, metadata, outcome),
        FolderFormat::Polygon => polygon(file, document, metadata, outcome),
    }
}

/// One record per `[Data]` taxon; the value names the `[INI]` entry holding
/// the extra information.
fn additional(
    file: &FolderFile<'_, '_>,
    document: &IniDocument,
    metadata: &IniSection,
    outcome: &mut FileOutcome,
) -> Result<(), Dropped> {
    let message = metadata_field(metadata, "ErrorMsg")?;
    let ini = required_section(document, INI)?;
    let data = required_section(document, DATA)?;

    for (taxon, key) in data.entries() {
        let section = data_entry(taxon);
        let Some(information) = ini_value(ini, key) else {
            outcome.skip(file.context.path, section, missing_ini_entry(key));
            continue;
        };
        file.push(
            outcome,
            &section,
            vec![
                ("taxon_key", FieldValue::from(taxon.as_str())),
                ("message", message.clone()),
                ("information", information),
            ],
        );
    }
    Ok(())
}

/// One record per `[Data]` taxon; the value is the difficulty key and the
/// `[INI]` entry of that key is the message.
fn difficulty(
    file: &FolderFile<'_, '_>,
    document: &IniDocument,
    outcome: &mut FileOutcome,
) -> Result<(), Dropped> {
    let ini = required_section(document, INI)?;
    let data = required_section(document, DATA)?;

    for (taxon, key) in data.entries() {
        let section = data_entry(taxon);
        let Some(message) = ini_value(ini, key) else {
            outcome.skip(file.context.path, section, missing_ini_entry(key));
            continue;
        };
        file.push(
            outcome,
            &section,
            vec![
                ("taxon_key", FieldValue::from(taxon.as_str())),
                ("message", message),
                ("difficulty_key", FieldValue::from(key.as_str())),
            ],
        );
    }
    Ok(())
}

/// A base record from `[Metadata]`, plus one record per stage listed in
/// `[Data]`.
fn period(
    file: &FolderFile<'_, '_>,
    document: &IniDocument,
    metadata: &IniSection,
    outcome: &mut FileOutcome,
) -> Result<(), Dropped> {
    let taxon = metadata_field(metadata, "Tvk")?;
    let message = metadata_field(metadata, "ErrorMsg")?;
    let start = metadata_field(metadata, "StartDate")?;
    let end = metadata_field(metadata, "EndDate")?;

    file.push(
        outcome,
        METADATA,
        vec![
            ("taxon_key", taxon.clone()),
            ("message", message.clone()),
            ("start_date", start),
            ("end_date", end),
        ],
    );

    let Some(data) = document.section(DATA).filter(|data| !data.is_empty()) else {
        return Ok(());
    };
    match stage_rows(data) {
        Ok(rows) => {
            for (stage, start, end) in rows {
                file.push(
                    outcome,
                    DATA,
                    vec![
                        ("taxon_key", taxon.clone()),
                        ("message", message.clone()),
                        ("start_date", FieldValue::from(start)),
                        ("end_date", FieldValue::from(end)),
                        ("stage", FieldValue::from(stage)),
                    ],
                );
            }
        }
        Err(reason) => outcome.skip(file.context.path, DATA, reason),
    }
    Ok(())
}

/// One record per file with the 10km squares of each country section.
fn polygon(
    file: &FolderFile<'_, '_>,
    document: &IniDocument,
    metadata: &IniSection,
    outcome: &mut FileOutcome,
) -> Result<(), Dropped> {
    let taxon = metadata_field(metadata, "DataRecordId")?;
    let message = metadata_field(metadata, "ErrorMsg")?;

    let mut values = vec![("taxon_key", taxon), ("message", message)];
    for &country in FolderFormat::Polygon.data_sections() {
        let squares: Vec<String> = document
            .section(country)
            .map(|section| section.keys().map(str::to_string).collect())
            .unwrap_or_default();
        values.push((country, FieldValue::List(squares)));
    }
    file.push(outcome, METADATA, values);
    Ok(())
}

/// Zips the multi-valued `Stage`, `StartDate` and `EndDate` entries.
fn stage_rows(data: &IniSection) -> Result<Vec<(&str, &str, &str)>, SkipReason> {
    let stages = stage_values(data, "Stage")?;
    let starts = stage_values(data, "StartDate")?;
    let ends = stage_values(data, "EndDate")?;

    if stages.len() != starts.len() || stages.len() != ends.len() {
        return Err(SkipReason::MismatchedStageLists {
            stages: stages.len(),
            start_dates: starts.len(),
            end_dates: ends.len(),
        });
    }
    Ok(stages
        .into_iter()
        .zip(starts)
        .zip(ends)
        .map(|((stage, start), end)| (stage, start, end))
        .collect())
}

/// Every line of every occurrence of `key`.
fn stage_values<'s>(data: &'s IniSection, key: &str) -> Result<Vec<&'s str>, SkipReason> {
    let values = data.get_all(key);
    if values.is_empty() {
        return Err(SkipReason::MissingRequiredField {
            field: key.to_string(),
        });
    }
    Ok(values.into_iter().flat_map(split_lines).collect())
}

fn is_structural(format: FolderFormat, name: &str) -> bool {
    name == METADATA || name == END_METADATA || format.data_sections().contains(&name)
}

fn required_section<'d>(
    document: &'d IniDocument,
    name: &'static str,
) -> Result<&'d IniSection, Dropped> {
    document.section(name).ok_or_else(|| {
        (
            name,
            SkipReason::MissingRequiredSection {
                section: name.to_string(),
            },
        )
    })
}

fn metadata_field(metadata: &IniSection, key: &str) -> Result<FieldValue, Dropped> {
    let value = metadata.get(key).map(clean_value).unwrap_or_default();
    if value.is_empty() {
        return Err((
            METADATA,
            SkipReason::MissingRequiredField {
                field: key.to_string(),
            },
        ));
    }
    Ok(FieldValue::Text(value))
}

fn ini_value(ini: &IniSection, key: &str) -> Option<FieldValue> {
    if key.is_empty() {
        return None;
    }
    ini.get(key)
        .map(clean_value)
        .filter(|value| !value.is_empty())
        .map(FieldValue::Text)
}

fn missing_ini_entry(key: &str) -> SkipReason {
    SkipReason::MissingRequiredField {
        field: format!("{INI}.{key}"),
    }
}

fn data_entry(key: &str) -> String {
    format!("{DATA}.{key}")
}
