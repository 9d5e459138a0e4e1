//! Tests for parsing organisation folders.

use std::fs;
use std::path::Path;

use nbn_ingest::{IngestError, ParserOptions, RuleParser};
use nbn_model::{FieldValue, SchemaTable, SkipReason, WHOLE_FILE};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(&path, text).expect("write rule file");
}

const RANGE_CHECK: &str = "[RangeCheck]\nmin=0\nmax=100\ntaxon=ABC123\n";

#[test]
fn organisation_name_comes_from_folder() {
    let dir = TempDir::new().expect("temp dir");
    let org = dir.path().join("OrgA");
    write(&org, "RangeRule1.ini", RANGE_CHECK);

    let schemas = SchemaTable::builtin();
    let outcome = RuleParser::new(&schemas).parse(&org).expect("parse");

    assert_eq!(outcome.organisation, "OrgA");
    assert_eq!(outcome.files_read, 1);
    assert_eq!(outcome.sections_read, 1);
    assert!(outcome.skips.is_empty());
    let records = outcome.accumulator.records("RangeCheck");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].organisation, "OrgA");
    assert_eq!(records[0].value("max"), Some(&FieldValue::Number(100.0)));
}

#[test]
fn malformed_file_does_not_stop_the_folder() {
    let dir = TempDir::new().expect("temp dir");
    let org = dir.path().join("OrgA");
    write(&org, "a_good.ini", RANGE_CHECK);
    write(&org, "b_bad.ini", "min=0\n[RangeCheck]\n");
    write(&org, "c_good.txt", RANGE_CHECK);

    let schemas = SchemaTable::builtin();
    let outcome = RuleParser::new(&schemas).parse(&org).expect("parse");

    assert_eq!(outcome.accumulator.count("RangeCheck"), 2);
    assert_eq!(outcome.skips.len(), 1);
    assert_eq!(outcome.skips[0].section, WHOLE_FILE);
    assert!(outcome.skips[0].reason.is_parse_error());
    assert!(outcome.skips[0].path.ends_with("b_bad.ini"));
}

#[test]
fn nbn_folder_layouts_are_recognised() {
    let dir = TempDir::new().expect("temp dir");
    let org = dir.path().join("Butterfly Conservation");
    write(
        &org,
        "Lepidoptera/TenKm/NBNSYS0000000010.txt",
        "[Metadata]\nTestType=WithoutPolygon\nDataRecordId=NBNSYS0000000010\n\
         ErrorMsg=Outside known range\n[EndMetadata]\n[10km_GB]\nSU01\nSU02\n",
    );
    write(
        &org,
        "Lepidoptera/FlightPeriod/NBNSYS0000000011.txt",
        "[Metadata]\nTestType=PeriodWithinYear\nTvk=NBNSYS0000000011\n\
         ErrorMsg=Outside flight period\nStartDate=0104\nEndDate=3009\n",
    );
    write(
        &org,
        "Moths_IDifficulty/difficulty.txt",
        "[Metadata]\nTestType=IdentificationDifficulty\n[INI]\n2=Check genitalia\n\
         [Data]\nNBNSYS0000000012=2\n",
    );

    let schemas = SchemaTable::builtin();
    let outcome = RuleParser::new(&schemas).parse(&org).expect("parse");

    assert!(outcome.skips.is_empty(), "{:?}", outcome.skips);
    assert_eq!(outcome.accumulator.count("regions"), 1);
    assert_eq!(outcome.accumulator.count("flightperiods"), 1);
    assert_eq!(outcome.accumulator.count("difficulties"), 1);
    let region = &outcome.accumulator.records("regions")[0];
    assert_eq!(region.cell("10km_GB"), "SU01;SU02");
    assert_eq!(region.organisation, "Butterfly Conservation");
}

#[test]
fn bsbi_leaf_folder_falls_back_on_name() {
    let dir = TempDir::new().expect("temp dir");
    let org = dir.path().join("BSBI");
    write(
        &org,
        "Plants/Plant_ranges/NBNSYS0000000020.txt",
        "[Metadata]\nTestType=WithoutPolygon\nDataRecordId=NBNSYS0000000020\nErrorMsg=m\n\
         [10km_Ireland]\nN01\n",
    );

    let schemas = SchemaTable::builtin();
    let outcome = RuleParser::new(&schemas).parse(&org).expect("parse");
    assert_eq!(outcome.accumulator.count("ranges"), 1);
}

#[test]
fn nested_folders_are_always_visited() {
    let dir = TempDir::new().expect("temp dir");
    let org = dir.path().join("OrgA");
    write(&org, "rule.ini", RANGE_CHECK);
    write(&org, "Regional/Personal/rule.ini", RANGE_CHECK);
    write(&org, "SystemRules/rule.ini", RANGE_CHECK);

    let schemas = SchemaTable::builtin();
    let outcome = RuleParser::new(&schemas)
        .with_options(ParserOptions::default())
        .parse(&org)
        .expect("parse");
    assert_eq!(outcome.files_read, 3);
    assert_eq!(outcome.accumulator.count("RangeCheck"), 3);
    assert!(outcome.skips.is_empty());
}

#[test]
fn unknown_sections_are_skipped_individually() {
    let dir = TempDir::new().expect("temp dir");
    let org = dir.path().join("OrgA");
    write(
        &org,
        "mixed.ini",
        "[RangeCheck]\nmin=1\nmax=2\ntaxon=T1\n\n[Mystery]\nfoo=bar\n",
    );

    let schemas = SchemaTable::builtin();
    let outcome = RuleParser::new(&schemas).parse(&org).expect("parse");
    assert_eq!(outcome.accumulator.total(), 1);
    assert_eq!(outcome.skips.len(), 1);
    assert_eq!(outcome.skips[0].section, "Mystery");
    assert_eq!(outcome.skips[0].reason, SkipReason::UnrecognizedRuleType);
}

#[test]
fn range_named_folder_keeps_section_convention() {
    let dir = TempDir::new().expect("temp dir");
    let org = dir.path().join("OrgA");
    write(&org, "RangeChecks/RangeRule1.ini", RANGE_CHECK);

    let schemas = SchemaTable::builtin();
    let outcome = RuleParser::new(&schemas).parse(&org).expect("parse");
    assert_eq!(outcome.accumulator.count("RangeCheck"), 1);
    assert_eq!(outcome.accumulator.count("ranges"), 0);
    assert!(outcome.skips.is_empty());
}

#[test]
fn parse_file_classifies_by_parent_folders() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("OrgA/Birds/Period/rule.txt");
    write(
        dir.path(),
        "OrgA/Birds/Period/rule.txt",
        "[Metadata]\nTestType=Period\nTvk=T1\nErrorMsg=m\nStartDate=1990\nEndDate=2020\n",
    );

    let schemas = SchemaTable::builtin();
    let outcome = RuleParser::new(&schemas).parse_file(&path, "OrgA");
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].rule_type, "periods");
    assert_eq!(outcome.sections, 1);
}

#[test]
fn missing_root_is_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let schemas = SchemaTable::builtin();
    let result = RuleParser::new(&schemas).parse(&dir.path().join("Nope"));
    assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
}
