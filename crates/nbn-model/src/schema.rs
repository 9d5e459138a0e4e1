//! Declarative rule schema table.
//!
//! Every rule type known to the exporter is described here once: how its
//! source files are laid out, which columns it produces and in what order,
//! and the kind and required-ness of each column. The parser validates
//! against this table and the CSV writer takes its header from it.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Column filled from the record's organisation rather than from the INI.
pub const ORGANISATION_COLUMN: &str = "organisation";

/// Output name reserved for the species list export.
pub const SPECIES_TABLE: &str = "species";

/// Output name reserved for the rule statistics export.
pub const STATS_TABLE: &str = "stats";

/// Column names that identify the taxon a rule applies to, in preference order.
const TAXON_COLUMNS: [&str; 2] = ["taxon_key", "taxon"];

/// Kind of value a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Date,
    List,
}

impl FieldKind {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::List => "list",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One output column of a rule type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind, required: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            required,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text, false)
    }

    pub fn organisation() -> Self {
        Self::text(ORGANISATION_COLUMN)
    }

    /// True for the column populated from the owning organisation.
    #[must_use]
    pub fn is_organisation(&self) -> bool {
        self.name == ORGANISATION_COLUMN
    }
}

/// Structure of the NBN rule files stored under a typed rule folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderFormat {
    /// `[Metadata]`, `[INI]` and `[Data]`; one record per Data entry, with
    /// the entry value naming the INI message.
    Additional,
    /// Same sections as [`FolderFormat::Additional`], keyed by difficulty.
    Difficulty,
    /// `[Metadata]` dates plus optional per-stage dates in `[Data]`.
    Period,
    /// `[Metadata]` plus 10km grid square lists per country section.
    Polygon,
}

impl FolderFormat {
    /// Sections this format consumes besides `[Metadata]` and `[EndMetadata]`.
    #[must_use]
    pub const fn data_sections(&self) -> &'static [&'static str] {
        match self {
            Self::Additional | Self::Difficulty => &["INI", "Data"],
            Self::Period => &["Data"],
            Self::Polygon => &["10km_GB", "10km_Ireland", "10km_CI"],
        }
    }

    /// Whether `,` separates keys from values (and bare keys are allowed).
    #[must_use]
    pub const fn list_style(&self) -> bool {
        matches!(self, Self::Additional | Self::Difficulty | Self::Polygon)
    }
}

/// How a directory name selects a folder rule type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderMatch {
    /// Directory name equals the pattern, ignoring ASCII case.
    Named(String),
    /// Directory name contains the pattern, ignoring ASCII case.
    Containing(String),
}

impl FolderMatch {
    #[must_use]
    pub fn matches(&self, directory: &str) -> bool {
        let directory = directory.to_ascii_lowercase();
        match self {
            Self::Named(name) => directory == name.to_ascii_lowercase(),
            Self::Containing(fragment) => directory.contains(&fragment.to_ascii_lowercase()),
        }
    }
}

/// Folder convention of a rule type whose files live in a typed folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRule {
    pub format: FolderFormat,
    /// Value `[Metadata] TestType` must carry (compared ignoring case).
    pub test_type: String,
    pub matches: Vec<FolderMatch>,
    /// Fragment matched against the file's own folder when no directory on
    /// the path matched. Some organisations keep rules one level shallower.
    pub fallback: Option<String>,
}

/// Where a rule type's records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleLayout {
    /// The section name is the rule type; one record per section.
    Section,
    /// The folder holding the file selects the rule type.
    Folder(FolderRule),
}

/// A rule type with its ordered output columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSchema {
    pub name: String,
    pub description: String,
    pub layout: RuleLayout,
    pub columns: Vec<ColumnSpec>,
}

impl RuleSchema {
    /// Column names in output order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Column holding the rule's taxon key, if the type has one.
    #[must_use]
    pub fn taxon_column(&self) -> Option<&str> {
        TAXON_COLUMNS.iter().find_map(|wanted| {
            self.columns
                .iter()
                .find(|column| column.name.eq_ignore_ascii_case(wanted))
                .map(|column| column.name.as_str())
        })
    }

    #[must_use]
    pub fn folder_rule(&self) -> Option<&FolderRule> {
        match &self.layout {
            RuleLayout::Folder(rule) => Some(rule),
            RuleLayout::Section => None,
        }
    }

    /// File name of the CSV export for this rule type.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name)
    }
}

/// A section rule type declared in the run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRuleDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub columns: Vec<ColumnSpec>,
}

/// Ordered table of every rule type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTable {
    schemas: Vec<RuleSchema>,
}

impl Default for SchemaTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SchemaTable {
    /// The NBN Record Cleaner rule types plus the built-in section types.
    #[must_use]
    pub fn builtin() -> Self {
        let message = || ColumnSpec::new("message", FieldKind::Text, true);
        let taxon = || ColumnSpec::new("taxon_key", FieldKind::Text, true);
        let dated = |staged: bool| {
            let mut columns = vec![
                taxon(),
                ColumnSpec::organisation(),
                message(),
                ColumnSpec::new("start_date", FieldKind::Text, true),
                ColumnSpec::new("end_date", FieldKind::Text, true),
            ];
            if staged {
                columns.push(ColumnSpec::text("stage"));
            }
            columns
        };
        let squares = || {
            vec![
                taxon(),
                ColumnSpec::organisation(),
                message(),
                ColumnSpec::new("10km_GB", FieldKind::List, false),
                ColumnSpec::new("10km_Ireland", FieldKind::List, false),
                ColumnSpec::new("10km_CI", FieldKind::List, false),
            ]
        };

        let schemas = vec![
            folder_schema(
                "additionals",
                "Additional (ancillary) species",
                FolderFormat::Additional,
                "AncillarySpecies",
                vec![FolderMatch::Named("additional".into())],
                None,
                vec![
                    taxon(),
                    ColumnSpec::organisation(),
                    message(),
                    ColumnSpec::new("information", FieldKind::Text, true),
                ],
            ),
            folder_schema(
                "difficulties",
                "Identification difficulty",
                FolderFormat::Difficulty,
                "IdentificationDifficulty",
                vec![FolderMatch::Containing("_idifficulty".into())],
                None,
                vec![
                    taxon(),
                    ColumnSpec::organisation(),
                    message(),
                    ColumnSpec::new("difficulty_key", FieldKind::Text, true),
                ],
            ),
            folder_schema(
                "flightperiods",
                "Flight period within year",
                FolderFormat::Period,
                "PeriodWithinYear",
                vec![FolderMatch::Named("flightperiod".into())],
                None,
                dated(true),
            ),
            folder_schema(
                "periods",
                "Recording period",
                FolderFormat::Period,
                "Period",
                vec![FolderMatch::Named("period".into())],
                Some("period"),
                dated(false),
            ),
            folder_schema(
                "ranges",
                "Known range (10km squares)",
                FolderFormat::Polygon,
                "WithoutPolygon",
                vec![FolderMatch::Named("range".into())],
                Some("range"),
                squares(),
            ),
            folder_schema(
                "regions",
                "Regional presence (10km squares)",
                FolderFormat::Polygon,
                "WithoutPolygon",
                vec![FolderMatch::Named("tenkm".into())],
                None,
                squares(),
            ),
            folder_schema(
                "seasonals",
                "Seasonal period within year",
                FolderFormat::Period,
                "PeriodWithinYear",
                vec![FolderMatch::Named("seasonalperiod".into())],
                None,
                dated(true),
            ),
            RuleSchema {
                name: "RangeCheck".to_string(),
                description: "Numeric range check".to_string(),
                layout: RuleLayout::Section,
                columns: vec![
                    ColumnSpec::new("min", FieldKind::Number, true),
                    ColumnSpec::new("max", FieldKind::Number, true),
                    ColumnSpec::new("taxon", FieldKind::Text, true),
                    ColumnSpec::organisation(),
                ],
            },
        ];
        Self { schemas }
    }

    /// Appends configured section rule types after validating them.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] for empty or duplicate names, names that
    /// collide with the species export, or invalid column lists.
    pub fn with_section_rules(mut self, definitions: &[SectionRuleDefinition]) -> Result<Self> {
        for definition in definitions {
            let schema = self.validate_definition(definition)?;
            self.schemas.push(schema);
        }
        Ok(self)
    }

    fn validate_definition(&self, definition: &SectionRuleDefinition) -> Result<RuleSchema> {
        let name = definition.name.trim();
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if name.eq_ignore_ascii_case(SPECIES_TABLE) || name.eq_ignore_ascii_case(STATS_TABLE) {
            return Err(SchemaError::ReservedName {
                name: name.to_string(),
            });
        }
        // Names double as CSV file names, so compare them ignoring case.
        if self
            .schemas
            .iter()
            .any(|schema| schema.name.eq_ignore_ascii_case(name))
        {
            return Err(SchemaError::DuplicateRuleType {
                name: name.to_string(),
            });
        }
        if definition.columns.is_empty() {
            return Err(SchemaError::NoColumns {
                name: name.to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        let mut columns = Vec::with_capacity(definition.columns.len() + 1);
        for column in &definition.columns {
            let column_name = column.name.trim();
            if column_name.is_empty() {
                return Err(SchemaError::EmptyColumn {
                    rule_type: name.to_string(),
                });
            }
            if !seen.insert(column_name.to_ascii_lowercase()) {
                return Err(SchemaError::DuplicateColumn {
                    rule_type: name.to_string(),
                    column: column_name.to_string(),
                });
            }
            columns.push(ColumnSpec::new(column_name, column.kind, column.required));
        }
        if !columns.iter().any(ColumnSpec::is_organisation) {
            columns.push(ColumnSpec::organisation());
        }

        Ok(RuleSchema {
            name: name.to_string(),
            description: definition.description.clone().unwrap_or_default(),
            layout: RuleLayout::Section,
            columns,
        })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RuleSchema> {
        self.schemas.iter().find(|schema| schema.name == name)
    }

    /// Section rule type whose name matches a section header exactly.
    #[must_use]
    pub fn section_rule(&self, section: &str) -> Option<&RuleSchema> {
        self.schemas
            .iter()
            .find(|schema| schema.layout == RuleLayout::Section && schema.name == section)
    }

    /// Folder rule types in table order.
    pub fn folder_rules(&self) -> impl Iterator<Item = (&RuleSchema, &FolderRule)> {
        self.schemas
            .iter()
            .filter_map(|schema| schema.folder_rule().map(|rule| (schema, rule)))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleSchema> {
        self.schemas.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(|schema| schema.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl<'a> IntoIterator for &'a SchemaTable {
    type Item = &'a RuleSchema;
    type IntoIter = std::slice::Iter<'a, RuleSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn folder_schema(
    name: &str,
    description: &str,
    format: FolderFormat,
    test_type: &str,
    matches: Vec<FolderMatch>,
    fallback: Option<&str>,
    columns: Vec<ColumnSpec>,
) -> RuleSchema {
    RuleSchema {
        name: name.to_string(),
        description: description.to_string(),
        layout: RuleLayout::Folder(FolderRule {
            format,
            test_type: test_type.to_string(),
            matches,
            fallback: fallback.map(str::to_string),
        }),
        columns,
    }
}
