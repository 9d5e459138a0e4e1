//! NBN rule ingestion.
//!
//! This crate reads an NBN Record Cleaner rule tree into typed records.
//!
//! # Features
//!
//! - **Discovery**: Find organisation folders and rule files, honouring the skip set
//! - **INI Reading**: Parse the configparser-style rule file dialect
//! - **Rule Parsing**: Classify files by folder or section name and convert them via the schema table
//! - **Species List**: Load the `#`-delimited master species list
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use nbn_ingest::{RuleParser, read_species_list};
//! use nbn_model::SchemaTable;
//!
//! let schemas = SchemaTable::builtin();
//! let outcome = RuleParser::new(&schemas).parse(Path::new("rules/OrgA"))?;
//! println!("{} records, {} skipped", outcome.record_count(), outcome.skips.len());
//!
//! let species = read_species_list(Path::new("rules/MasterSpeciesList.txt"))?;
//! ```

pub mod coerce;
mod discovery;
mod error;
pub mod ini;
mod parser;
mod species;
mod text;

// === Error Types ===
pub use error::{IngestError, Result};

// === Typed Coercion ===
pub use coerce::{CoerceError, coerce};

// === INI Reading ===
pub use ini::{IniDocument, IniError, IniOptions, IniSection};

// === File Discovery ===
pub use discovery::{
    FileListing, directory_names, ensure_directory, folder_name, has_extension, list_rule_files,
    list_subdirectories, relative_directories,
};

// === Rule Parsing ===
pub use parser::{
    DEFAULT_RULE_EXTENSIONS, DEFAULT_SKIP_FOLDERS, FileOutcome, ParseOutcome, ParserOptions,
    RuleParser,
};

// === Species List ===
pub use species::{
    DEFAULT_SPECIES_LIST, FIELD_SEPARATOR, SpeciesOutcome, parse_species_list, read_species_list,
};

// === Text Helpers ===
pub use text::{clean_value, decode_text, read_text, split_lines};
