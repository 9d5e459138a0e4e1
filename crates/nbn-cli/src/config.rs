//! Run configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Command line flags are applied on top by the binary.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use nbn_ingest::{
    DEFAULT_RULE_EXTENSIONS, DEFAULT_SKIP_FOLDERS, DEFAULT_SPECIES_LIST, ParserOptions,
};
use nbn_model::{SchemaError, SchemaTable, SectionRuleDefinition};
use nbn_output::WritePolicy;

/// Errors raised while loading or applying a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid rule type: {0}")]
    Schema(#[from] SchemaError),

    #[error("no rule file extensions configured")]
    NoExtensions,
}

/// Settings for one export run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Organisation folder names that are never visited.
    pub skip_folders: BTreeSet<String>,
    /// Species list, relative to the input root unless absolute.
    pub species_list: PathBuf,
    /// Extensions of rule files (without the dot, any case).
    pub rule_extensions: Vec<String>,
    pub write_policy: WritePolicy,
    /// Also write `stats.csv` with rule coverage per species list taxon.
    pub stats: bool,
    /// Section rule types appended to the built-in table.
    pub rule_types: Vec<SectionRuleDefinition>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            skip_folders: DEFAULT_SKIP_FOLDERS.map(String::from).into(),
            species_list: PathBuf::from(DEFAULT_SPECIES_LIST),
            rule_extensions: DEFAULT_RULE_EXTENSIONS.map(String::from).to_vec(),
            write_policy: WritePolicy::default(),
            stats: false,
            rule_types: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            rule_types = config.rule_types.len(),
            "loaded run configuration"
        );
        Ok(config)
    }

    /// Built-in rule types followed by the configured ones.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Schema`] when a configured rule type is invalid.
    pub fn schema_table(&self) -> Result<SchemaTable, ConfigError> {
        Ok(SchemaTable::builtin().with_section_rules(&self.rule_types)?)
    }

    /// Checks settings that cannot be expressed in the types.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoExtensions`] when no extension is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .rule_extensions
            .iter()
            .all(|ext| ext.trim_start_matches('.').trim().is_empty())
        {
            return Err(ConfigError::NoExtensions);
        }
        Ok(())
    }

    #[must_use]
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            extensions: self
                .rule_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').trim().to_string())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Species list location for an input root.
    #[must_use]
    pub fn species_list_path(&self, input_root: &Path) -> PathBuf {
        if self.species_list.is_absolute() {
            self.species_list.clone()
        } else {
            input_root.join(&self.species_list)
        }
    }
}
