//! End-to-end tests for the rule export pipeline.

use std::fs;
use std::path::PathBuf;

use nbn_cli::config::RunConfig;
use nbn_cli::error::RunError;
use nbn_cli::pipeline::RuleController;
use nbn_model::{SchemaTable, SkipReason, WHOLE_FILE};
use nbn_output::{OutputError, WritePolicy};
use tempfile::TempDir;

const RANGE_CHECK: &str = "[RangeCheck]\nmin=0\nmax=100\ntaxon=ABC123\n";

const SPECIES_LIST: &str = "' exported from the species dictionary\n\
                            TAXON_KEY#PREF#NAME#AUTH#GROUP#TYPE#WF#MSG\n\
                            NBNSYS1#NBNSYS1#Bombus terrestris#(Linnaeus, 1758)#insect - hymenopteran#S#Y#12\n";

struct Workspace {
    _dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let input = dir.path().join("rules");
        let output = dir.path().join("out");
        fs::create_dir_all(&input).expect("input dir");
        fs::create_dir_all(&output).expect("output dir");
        Self {
            _dir: dir,
            input,
            output,
        }
    }

    fn write(&self, relative: &str, text: &str) {
        let path = self.input.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(&path, text).expect("write rule file");
    }

    fn read(&self, file: &str) -> String {
        fs::read_to_string(self.output.join(file))
            .expect("read csv")
            .replace('\r', "\n")
    }
}

fn export(workspace: &Workspace, config: RunConfig) -> nbn_cli::types::RunReport {
    RuleController::new(config)
        .expect("controller")
        .run(&workspace.input, &workspace.output)
        .expect("run")
}

#[test]
fn system_rules_folder_is_never_exported() {
    let ws = Workspace::new();
    ws.write("OrgA/RangeRule1.ini", RANGE_CHECK);
    ws.write("SystemRules/RangeRule2.ini", "[RangeCheck]\nmin=5\nmax=6\ntaxon=SYS\n");

    let report = export(&ws, RunConfig::default());

    insta::assert_snapshot!(ws.read("RangeCheck.csv"), @r#"
    "min","max","taxon","organisation"
    0,100,"ABC123","OrgA"
    "#);
    assert!(report.skips.is_empty(), "{:?}", report.skips);
    assert_eq!(report.skip_log(), "");
    assert_eq!(report.skipped_folders, vec!["SystemRules"]);
    assert_eq!(report.organisations.len(), 1);
    assert_eq!(report.record_count("RangeCheck"), 1);
}

#[test]
fn every_rule_type_gets_a_file() {
    let ws = Workspace::new();
    ws.write("OrgA/RangeRule1.ini", RANGE_CHECK);

    let report = export(&ws, RunConfig::default());

    let schemas = SchemaTable::builtin();
    assert_eq!(report.tables.len(), schemas.len());
    for schema in &schemas {
        let table = report.table(&schema.name).expect("table summary");
        let path = table.path.as_ref().expect("written");
        assert!(path.is_file(), "{}", path.display());
    }
    assert_eq!(
        ws.read("regions.csv"),
        "\"taxon_key\",\"organisation\",\"message\",\"10km_GB\",\"10km_Ireland\",\"10km_CI\"\n"
    );
    assert_eq!(report.table("regions").map(|t| t.organisations), Some(0));
}

#[test]
fn personal_folder_is_skipped() {
    let ws = Workspace::new();
    ws.write("Personal/RangeRule1.ini", RANGE_CHECK);
    ws.write("OrgB/rules.txt", "[RangeCheck]\nmin=1\nmax=2\ntaxon=B\n");

    let report = export(&ws, RunConfig::default());

    let csv = ws.read("RangeCheck.csv");
    assert!(!csv.contains("Personal"));
    assert!(csv.contains("\"OrgB\""));
    assert_eq!(report.skipped_folders, vec!["Personal"]);
}

#[test]
fn skip_set_comes_from_the_config() {
    let ws = Workspace::new();
    ws.write("Personal/RangeRule1.ini", RANGE_CHECK);
    ws.write("Drafts/RangeRule1.ini", RANGE_CHECK);

    let config = RunConfig {
        skip_folders: ["Drafts".to_string()].into(),
        ..RunConfig::default()
    };
    let report = export(&ws, config);

    assert_eq!(report.skipped_folders, vec!["Drafts"]);
    assert_eq!(report.organisations[0].name, "Personal");
    assert_eq!(report.record_count("RangeCheck"), 1);
}

#[test]
fn skip_set_only_applies_to_top_level_folders() {
    let ws = Workspace::new();
    ws.write("OrgA/Regional/Personal/rule.ini", RANGE_CHECK);

    let report = export(&ws, RunConfig::default());

    assert!(report.skipped_folders.is_empty());
    assert!(report.skips.is_empty());
    assert_eq!(report.record_count("RangeCheck"), 1);
    assert!(ws.read("RangeCheck.csv").contains("\"OrgA\""));
}

#[test]
fn repeated_runs_write_identical_files() {
    let ws = Workspace::new();
    ws.write("OrgB/b.ini", "[RangeCheck]\nmin=1.5\nmax=2\ntaxon=Bombus\n");
    ws.write("OrgA/a.ini", RANGE_CHECK);
    ws.write(
        "OrgA/Insects/FlightPeriod/NBNSYS1.txt",
        "[Metadata]\nTestType=PeriodWithinYear\nTvk=NBNSYS1\nErrorMsg=Out of season\n\
         StartDate=0104\nEndDate=3009\n",
    );
    ws.write("MasterSpeciesList.txt", SPECIES_LIST);

    let snapshot = |ws: &Workspace| {
        let mut files: Vec<(PathBuf, Vec<u8>)> = fs::read_dir(&ws.output)
            .expect("list output")
            .map(|entry| {
                let path = entry.expect("entry").path();
                let bytes = fs::read(&path).expect("read output");
                (path, bytes)
            })
            .collect();
        files.sort();
        files
    };

    export(&ws, RunConfig::default());
    let first = snapshot(&ws);
    export(&ws, RunConfig::default());
    let second = snapshot(&ws);

    assert_eq!(first.len(), SchemaTable::builtin().len() + 1);
    assert_eq!(first, second);
    let range = ws.read("RangeCheck.csv");
    let org_a = range.find("OrgA").expect("OrgA row");
    let org_b = range.find("OrgB").expect("OrgB row");
    assert!(org_a < org_b);
}

#[test]
fn malformed_file_is_one_skip() {
    let ws = Workspace::new();
    ws.write("OrgA/a.ini", RANGE_CHECK);
    ws.write("OrgA/b.ini", "min=0\n[RangeCheck]\n");
    ws.write("OrgB/c.ini", "[RangeCheck]\nmin=1\nmax=2\ntaxon=C\n");

    let report = export(&ws, RunConfig::default());

    assert_eq!(report.record_count("RangeCheck"), 2);
    assert_eq!(report.skips.len(), 1);
    let skip = &report.skips[0];
    assert_eq!(skip.section, WHOLE_FILE);
    assert!(skip.reason.is_parse_error());
    let log = report.skip_log();
    assert!(log.starts_with("[*] - "), "{log}");
    assert!(
        log.ends_with("b.ini: parse error: line 1: entry outside of any section\n"),
        "{log}"
    );
}

#[test]
fn missing_required_field_is_logged() {
    let ws = Workspace::new();
    ws.write(
        "OrgA/rules.ini",
        "[RangeCheck]\nmin=0\ntaxon=A\n\n[Unknown]\nx=1\n",
    );

    let report = export(&ws, RunConfig::default());

    assert_eq!(report.record_count("RangeCheck"), 0);
    assert_eq!(report.skips.len(), 2);
    assert_eq!(report.skips[0].section, "RangeCheck");
    assert_eq!(
        report.skips[0].reason,
        SkipReason::MissingRequiredField {
            field: "max".into()
        }
    );
    assert_eq!(report.skips[1].reason, SkipReason::UnrecognizedRuleType);
    assert!(report.skip_log().contains("missing required field 'max'"));
    assert_eq!(ws.read("RangeCheck.csv"), "\"min\",\"max\",\"taxon\",\"organisation\"\n");
}

#[test]
fn folder_layouts_are_exported() {
    let ws = Workspace::new();
    ws.write(
        "Butterfly Conservation/Lepidoptera/TenKm/NBNSYS10.txt",
        "[Metadata]\nTestType=WithoutPolygon\nDataRecordId=NBNSYS10\nErrorMsg=Outside range\n\
         [EndMetadata]\n[10km_GB]\nSU01\nSU02\n",
    );
    ws.write(
        "Butterfly Conservation/Moths_IDifficulty/difficulty.txt",
        "[Metadata]\nTestType=IdentificationDifficulty\n[INI]\n2=Check genitalia\n\
         [Data]\nNBNSYS12=2\nNBNSYS13=9\n",
    );

    let report = export(&ws, RunConfig::default());

    assert_eq!(report.record_count("regions"), 1);
    assert_eq!(report.record_count("difficulties"), 1);
    assert_eq!(report.skips.len(), 1);
    assert_eq!(report.skips[0].section, "Data.NBNSYS13");
    assert!(ws.read("regions.csv").contains("\"SU01;SU02\""));
    assert!(ws.read("difficulties.csv").contains("\"Check genitalia\""));
}

#[test]
fn species_list_is_exported() {
    let ws = Workspace::new();
    ws.write("MasterSpeciesList.txt", SPECIES_LIST);

    let report = export(&ws, RunConfig::default());

    assert_eq!(report.species_count, 1);
    assert!(report.species.is_some());
    assert!(report.stats.is_none());
    assert!(!ws.output.join("stats.csv").exists());
    insta::assert_snapshot!(ws.read("species.csv"), @r#"
    "taxon_key","preferred_tvk","name","authority","group","name_type","well_formed","msg_id"
    "NBNSYS1","NBNSYS1","Bombus terrestris","(Linnaeus, 1758)","insect - hymenopteran","S","Y",12
    "#);
}

#[test]
fn stats_credit_synonyms_to_preferred_taxon() {
    let ws = Workspace::new();
    ws.write(
        "MasterSpeciesList.txt",
        "TAXON_KEY#PREF#NAME#AUTH#GROUP#TYPE#WF#MSG\n\
         NBNSYS1#NBNSYS1#Bombus terrestris#(Linnaeus, 1758)#insect - hymenopteran#S#Y#12\n\
         NBNSYS2#NBNSYS1#Bombus agg.##insect - hymenopteran#S#Y#\n",
    );
    ws.write(
        "OrgA/Insects/FlightPeriod/NBNSYS2.txt",
        "[Metadata]\nTestType=PeriodWithinYear\nTvk=NBNSYS2\nErrorMsg=Out of season\n\
         StartDate=0104\nEndDate=3009\n",
    );
    ws.write("OrgA/a.ini", RANGE_CHECK);

    let config = RunConfig {
        stats: true,
        ..RunConfig::default()
    };
    let report = export(&ws, config);

    let stats = report.stats.as_ref().expect("stats computed");
    assert_eq!(stats.total_rules(), 2);
    assert_eq!(stats.orphan_taxa, vec!["ABC123"]);
    assert_eq!(stats.synonyms_with_rules, 1);
    assert!(report.stats_file.is_some());
    insta::assert_snapshot!(ws.read("stats.csv"), @r#"
    "taxon_key","preferred_tvk","rules_total","rules_own","rules_preferred","additionals","difficulties","flightperiods","periods","ranges","regions","seasonals","RangeCheck"
    "NBNSYS1","NBNSYS1",1,0,1,0,0,0,0,0,0,0,0
    "NBNSYS2","NBNSYS1",1,1,0,0,0,1,0,0,0,0,0
    "#);
}

#[test]
fn missing_species_list_gives_header_only_file() {
    let ws = Workspace::new();
    ws.write("OrgA/a.ini", RANGE_CHECK);

    let report = export(&ws, RunConfig::default());

    assert_eq!(report.species_count, 0);
    assert!(report.skips.is_empty());
    assert_eq!(
        ws.read("species.csv"),
        "\"taxon_key\",\"preferred_tvk\",\"name\",\"authority\",\"group\",\"name_type\",\"well_formed\",\"msg_id\"\n"
    );
}

#[test]
fn species_list_path_can_be_absolute() {
    let ws = Workspace::new();
    let list = ws.output.parent().expect("parent").join("elsewhere.txt");
    fs::write(&list, SPECIES_LIST).expect("write list");

    let config = RunConfig {
        species_list: list,
        ..RunConfig::default()
    };
    let report = export(&ws, config);
    assert_eq!(report.species_count, 1);
}

#[test]
fn bad_directories_are_fatal() {
    let ws = Workspace::new();
    ws.write("OrgA/a.ini", RANGE_CHECK);
    let controller = RuleController::new(RunConfig::default()).expect("controller");

    let missing = ws.input.join("missing");
    assert!(matches!(
        controller.run(&missing, &ws.output),
        Err(RunError::Input { .. })
    ));

    let missing_output = ws.output.join("missing");
    assert!(matches!(
        controller.run(&ws.input, &missing_output),
        Err(RunError::Output {
            source: OutputError::OutputDirNotFound { .. }
        })
    ));
    assert!(fs::read_dir(&ws.output).expect("list").next().is_none());
}

#[test]
fn blocked_file_follows_write_policy() {
    let ws = Workspace::new();
    ws.write("OrgA/a.ini", RANGE_CHECK);
    fs::create_dir(ws.output.join("RangeCheck.csv")).expect("block file");

    let report = export(&ws, RunConfig::default());
    assert_eq!(report.failures.len(), 1);
    assert!(report.has_failures());
    assert_eq!(report.table("RangeCheck").and_then(|t| t.path.as_ref()), None);
    assert!(ws.output.join("ranges.csv").is_file());
    assert!(report.species.is_some());

    let config = RunConfig {
        write_policy: WritePolicy::Abort,
        ..RunConfig::default()
    };
    let result = RuleController::new(config)
        .expect("controller")
        .run(&ws.input, &ws.output);
    assert!(matches!(result, Err(RunError::WriteAborted { .. })));
}

#[test]
fn configured_rule_type_is_exported() {
    let ws = Workspace::new();
    ws.write(
        "OrgA/period.ini",
        "[PeriodCheck]\ntaxon=NBNSYS1\nstart=2020-03-01\n\n[RangeCheck]\nmin=0\nmax=1\ntaxon=A\n",
    );
    let config: RunConfig = toml::from_str(
        r#"
        [[rule_types]]
        name = "PeriodCheck"
        columns = [
          { name = "taxon", kind = "text", required = true },
          { name = "start", kind = "date", required = true },
          { name = "organisation" },
        ]
        "#,
    )
    .expect("config");

    let report = export(&ws, config);

    assert!(report.skips.is_empty(), "{:?}", report.skips);
    assert_eq!(report.record_count("PeriodCheck"), 1);
    assert_eq!(report.record_count("RangeCheck"), 1);
    assert!(ws.output.join("PeriodCheck.csv").is_file());
    assert!(ws.read("PeriodCheck.csv").starts_with("\"taxon\",\"start\",\"organisation\"\n"));
}

#[test]
fn invalid_configured_rule_type_is_a_config_error() {
    let config = RunConfig {
        rule_types: vec![nbn_model::SectionRuleDefinition {
            name: "species".into(),
            description: None,
            columns: vec![nbn_model::ColumnSpec::text("taxon")],
        }],
        ..RunConfig::default()
    };
    assert!(matches!(
        RuleController::new(config),
        Err(RunError::Config(_))
    ));
}
