//! Section-name convention: `[RuleType]` headers, one record per section.

use nbn_model::{RuleRecord, RuleSchema, SchemaTable, SkipReason};

use super::{FileContext, FileOutcome};
use crate::coerce::coerce;
use crate::ini::{IniDocument, IniOptions, IniSection};

pub(super) fn parse_section_file(
    context: &FileContext<'_>,
    schemas: &SchemaTable,
    text: &str,
    outcome: &mut FileOutcome,
) {
    let document = match IniDocument::parse(text, IniOptions::STANDARD) {
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

    for section in document.sections() {
        let Some(schema) = schemas.section_rule(section.name()) else {
            outcome.skip(context.path, section.name(), SkipReason::UnrecognizedRuleType);
            continue;
        };
        match section_record(context, schema, section) {
            Ok(record) => outcome.records.push(record),
            Err(reason) => outcome.skip(context.path, section.name(), reason),
        }
    }
}

/// Converts one section into a record of `schema`.
///
/// Keys the schema does not name are ignored.
fn section_record(
    context: &FileContext<'_>,
    schema: &RuleSchema,
    section: &IniSection,
) -> Result<RuleRecord, SkipReason> {
    let mut values = Vec::with_capacity(schema.columns.len());
    for column in schema.columns.iter().filter(|column| !column.is_organisation()) {
        let raw = section.get(&column.name).unwrap_or_default();
        let value = coerce(column.kind, raw).map_err(|err| SkipReason::InvalidValue {
            field: column.name.clone(),
            message: err.to_string(),
        })?;
        values.push((column.name.as_str(), value));
    }
    context.record(schema, values)
}
