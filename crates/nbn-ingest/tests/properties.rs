//! Property tests for the parser and typed coercion.

use std::fs;

use nbn_ingest::{RuleParser, coerce};
use nbn_model::{ColumnSpec, FieldKind, SchemaTable, SectionRuleDefinition};
use proptest::prelude::*;
use tempfile::TempDir;

fn schemas() -> SchemaTable {
    let definition = |name: &str, column: ColumnSpec| SectionRuleDefinition {
        name: name.to_string(),
        description: None,
        columns: vec![column],
    };
    SchemaTable::builtin()
        .with_section_rules(&[
            definition("CheckA", ColumnSpec::new("taxon", FieldKind::Text, true)),
            definition("CheckB", ColumnSpec::new("limit", FieldKind::Number, true)),
            definition("CheckC", ColumnSpec::new("from", FieldKind::Date, false)),
        ])
        .expect("valid definitions")
}

const SECTION_NAMES: [&str; 7] = [
    "CheckA", "CheckB", "CheckC", "RangeCheck", "Unknown", "rangecheck", "Misc",
];

fn section_text(name: &str, valid: bool) -> String {
    let body = match (name, valid) {
        ("CheckA", true) => "taxon=T1",
        ("CheckB", true) => "limit=42",
        ("CheckB", false) => "limit=many",
        ("CheckC", true) => "from=2020-01-31",
        ("CheckC", false) => "from=31 January",
        ("RangeCheck", true) => "min=0\nmax=10\ntaxon=T2",
        _ => "other=1",
    };
    format!("[{name}]\n{body}\n\n")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn records_plus_skips_equal_sections(
        names in prop::sample::subsequence(SECTION_NAMES.to_vec(), 0..=SECTION_NAMES.len()),
        valid in prop::collection::vec(any::<bool>(), SECTION_NAMES.len()),
    ) {
        let text: String = names
            .iter()
            .zip(&valid)
            .map(|(name, ok)| section_text(name, *ok))
            .collect();
        let dir = TempDir::new().expect("temp dir");
        let org = dir.path().join("OrgA");
        fs::create_dir_all(&org).expect("create org");
        fs::write(org.join("rules.ini"), text).expect("write rules");

        let schemas = schemas();
        let outcome = RuleParser::new(&schemas).parse(&org).expect("parse");

        prop_assert_eq!(outcome.sections_read, names.len());
        prop_assert_eq!(outcome.accumulator.total() + outcome.skips.len(), names.len());
    }

    #[test]
    fn coercion_never_panics(raw in ".*") {
        for kind in [FieldKind::Text, FieldKind::Number, FieldKind::Date, FieldKind::List] {
            let _ = coerce(kind, &raw);
        }
    }

    #[test]
    fn finite_numbers_round_trip(number in -1.0e12f64..1.0e12f64) {
        let value = coerce(FieldKind::Number, &number.to_string()).expect("number");
        prop_assert_eq!(value.to_string().parse::<f64>().expect("display"), number);
    }
}
