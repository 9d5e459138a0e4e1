//! NBN rule export writers.
//!
//! This crate writes the merged rule records to one CSV file per rule
//! type, plus the species list and rule statistics exports.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use nbn_output::{WritePolicy, write_rule_tables};
//!
//! let report = write_rule_tables(&accumulator, &schemas, Path::new("out"), WritePolicy::Continue)?;
//! for file in &report.written {
//!     println!("{}: {} rows", file.path.display(), file.records);
//! }
//! ```

mod error;
mod tables;
mod types;

// === Error Types ===
pub use error::{OutputError, Result};

// === Writers ===
pub use tables::{
    ensure_output_dir, write_rule_table, write_rule_tables, write_species_list, write_stats,
};

// === Report Types ===
pub use types::{WritePolicy, WriteReport, WrittenFile};
