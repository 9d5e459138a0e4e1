//! CLI argument definitions for the NBN rule exporter.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{ColorChoice, Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use nbn_cli::logging::{LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "nbn-rules",
    version,
    about = "NBN Record Cleaner rule exporter - Convert rule files to CSV",
    long_about = "Export NBN Record Cleaner verification rules to CSV.\n\n\
                  Walks every organisation folder under the input root, parses its\n\
                  INI rule files and writes one CSV per rule type plus species.csv.\n\
                  Sections that cannot be used are listed in the skip log."
)]
pub struct Cli {
    /// Root folder holding one sub-folder per organisation.
    #[arg(
        short = 'i',
        long = "input",
        value_name = "DIR",
        required_unless_present = "list_rule_types"
    )]
    pub input: Option<PathBuf>,

    /// Existing directory the CSV files are written to.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        required_unless_present = "list_rule_types"
    )]
    pub output: Option<PathBuf>,

    /// TOML run configuration.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Organisation folder to skip (repeatable; replaces the configured set).
    #[arg(long = "skip-folder", value_name = "NAME")]
    pub skip_folders: Vec<String>,

    /// Species list file, relative to the input root unless absolute.
    #[arg(long = "species-list", value_name = "FILE")]
    pub species_list: Option<PathBuf>,

    /// Stop at the first CSV file that cannot be written.
    #[arg(long = "abort-on-write-error")]
    pub abort_on_write_error: bool,

    /// Write the skip log to a file.
    #[arg(long = "skip-log", value_name = "PATH")]
    pub skip_log: Option<PathBuf>,

    /// Also write stats.csv with rule coverage per species list taxon.
    #[arg(long = "stats")]
    pub stats: bool,

    /// Show a progress bar while organisation folders are parsed.
    #[arg(long = "progress")]
    pub progress: bool,

    /// Print the rule types and their columns, then exit.
    #[arg(long = "list-rule-types")]
    pub list_rule_types: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Logging settings: `--log-level` beats `-v`/`-q`, and either one
    /// disables `RUST_LOG`.
    pub fn log_config(&self) -> LogConfig {
        let config = match self.log_level {
            Some(level) => LogConfig::default().with_level(level.into()),
            None if self.verbosity.is_present() => {
                LogConfig::default().with_level(self.verbosity.tracing_level_filter())
            }
            None => LogConfig::default(),
        };
        let ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
        };
        LogConfig {
            format: self.log_format.into(),
            ansi,
            log_file: self.log_file.clone(),
            ..config
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}
