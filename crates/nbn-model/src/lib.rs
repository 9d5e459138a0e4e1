//! Data model for the NBN rule exporter.

pub mod accumulator;
pub mod error;
pub mod record;
pub mod schema;
pub mod skip;
pub mod species;
pub mod stats;

pub use accumulator::RuleAccumulator;
pub use error::{Result, SchemaError};
pub use record::{FieldValue, RuleRecord};
pub use schema::{
    ColumnSpec, FieldKind, FolderFormat, FolderMatch, FolderRule, ORGANISATION_COLUMN,
    RuleLayout, RuleSchema, SPECIES_TABLE, STATS_TABLE, SchemaTable, SectionRuleDefinition,
};
pub use skip::{SkipEntry, SkipReason, WHOLE_FILE};
pub use species::{SPECIES_COLUMNS, SpeciesEntry};
pub use stats::{RuleStats, STATS_COLUMNS, TaxonStats};
