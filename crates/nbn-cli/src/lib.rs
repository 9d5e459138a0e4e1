//! NBN rule exporter pipeline.
//!
//! This crate ties the ingest and output crates together behind
//! [`pipeline::RuleController`] and provides the run configuration and
//! logging setup used by the `nbn-rules` binary.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use nbn_cli::config::RunConfig;
//! use nbn_cli::pipeline::RuleController;
//!
//! let report = RuleController::new(RunConfig::default())?
//!     .run(Path::new("rules"), Path::new("out"))?;
//! print!("{}", report.skip_log());
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;
