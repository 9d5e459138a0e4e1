//! Rule Parser: turns one organisation folder into typed rule records.
//!
//! Each rule file is classified by where it lives. A file inside a typed
//! rule folder (`Range`, `FlightPeriod`, `..._IDifficulty`, ...) is read with
//! that folder type's layout. Any other file uses the section-name
//! convention, where every section header names its rule type.
//!
//! Nothing inside a file is fatal. Syntax errors, unknown sections and
//! missing or invalid fields become [`SkipEntry`] values in the outcome.

mod folder;
mod section;

use std::path::Path;

use nbn_model::{
    FieldValue, FolderMatch, FolderRule, RuleAccumulator, RuleRecord, RuleSchema, SchemaTable,
    SkipEntry, SkipReason, WHOLE_FILE,
};

use crate::discovery::{directory_names, folder_name, list_rule_files, relative_directories};
use crate::error::{IngestError, Result};
use crate::text::read_text;

/// Organisation folders under the input root that are never exported.
pub const DEFAULT_SKIP_FOLDERS: [&str; 3] =
    ["National Biodiversity Network Trust", "Personal", "SystemRules"];

/// File extensions treated as rule files.
pub const DEFAULT_RULE_EXTENSIONS: [&str; 2] = ["txt", "ini"];

/// File selection settings for the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    pub extensions: Vec<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_RULE_EXTENSIONS.map(String::from).to_vec(),
        }
    }
}

/// Records and skips produced by a single rule file.
#[derive(Debug, Default)]
pub struct FileOutcome {
    pub records: Vec<RuleRecord>,
    pub skips: Vec<SkipEntry>,
    /// Distinct sections in the file (0 when it could not be parsed).
    pub sections: usize,
}

impl FileOutcome {
    fn skip(&mut self, path: &Path, section: impl Into<String>, reason: SkipReason) {
        self.skips.push(SkipEntry::new(path, section, reason));
    }

    fn skip_file(&mut self, path: &Path, reason: SkipReason) {
        self.skips.push(SkipEntry::file(path, reason));
    }
}

/// Result of parsing one organisation folder.
#[derive(Debug)]
pub struct ParseOutcome {
    pub organisation: String,
    pub accumulator: RuleAccumulator,
    pub skips: Vec<SkipEntry>,
    pub files_read: usize,
    pub sections_read: usize,
}

impl ParseOutcome {
    fn new(organisation: String) -> Self {
        Self {
            organisation,
            accumulator: RuleAccumulator::new(),
            skips: Vec::new(),
            files_read: 0,
            sections_read: 0,
        }
    }

    fn absorb(&mut self, file: FileOutcome) {
        self.files_read += 1;
        self.sections_read += file.sections;
        for record in file.records {
            self.accumulator.push(record);
        }
        self.skips.extend(file.skips);
    }

    /// Total records across all rule types.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.accumulator.total()
    }
}

/// Parses rule files against a schema table.
#[derive(Debug, Clone)]
pub struct RuleParser<'a> {
    schemas: &'a SchemaTable,
    options: ParserOptions,
}

impl<'a> RuleParser<'a> {
    #[must_use]
    pub fn new(schemas: &'a SchemaTable) -> Self {
        Self {
            schemas,
            options: ParserOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parses every rule file under an organisation folder.
    ///
    /// The organisation name is the folder's own name. Files are visited in
    /// sorted path order, so the record order is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] only when `root` itself is missing or cannot
    /// be listed.
    pub fn parse(&self, root: &Path) -> Result<ParseOutcome> {
        let organisation = folder_name(root).unwrap_or_default().to_string();
        let listing = list_rule_files(root, &self.options.extensions)?;
        let mut outcome = ParseOutcome::new(organisation);

        for err in listing.errors {
            outcome.skips.push(unreadable(&err));
        }
        for path in &listing.files {
            let directories = relative_directories(root, path);
            let file = self.parse_located(path, &outcome.organisation, &directories);
            outcome.absorb(file);
        }

        tracing::debug!(
            organisation = %outcome.organisation,
            files = outcome.files_read,
            sections = outcome.sections_read,
            records = outcome.record_count(),
            skipped = outcome.skips.len(),
            "parsed organisation folder"
        );
        Ok(outcome)
    }

    /// Parses a single rule file for `organisation`.
    ///
    /// Every directory on the file's path takes part in folder
    /// classification, nearest first. The group-folder fallback needs the
    /// path relative to the organisation, so it only applies through
    /// [`RuleParser::parse`].
    #[must_use]
    pub fn parse_file(&self, path: &Path, organisation: &str) -> FileOutcome {
        let directories = path.parent().map(directory_names).unwrap_or_default();
        self.parse_located(path, organisation, &directories)
    }

    /// Folder rule type selected by the directories above a file.
    ///
    /// `directories` are relative to the organisation folder, outermost
    /// first. The deepest directory matching a folder convention wins. When
    /// none matches and the file sits directly in a group folder
    /// (`<folder>/<group>/`), the group name is tried against the fallback
    /// fragments. Anything else uses the section convention.
    #[must_use]
    pub fn classify(&self, directories: &[String]) -> Option<(&'a RuleSchema, &'a FolderRule)> {
        let schemas = self.schemas;
        for directory in directories.iter().rev() {
            let found = schemas
                .folder_rules()
                .find(|(_, rule)| rule.matches.iter().any(|m| m.matches(directory)));
            if found.is_some() {
                return found;
            }
        }
        let [_, leaf] = directories else {
            return None;
        };
        schemas.folder_rules().find(|(_, rule)| {
            rule.fallback
                .as_ref()
                .is_some_and(|fragment| FolderMatch::Containing(fragment.clone()).matches(leaf))
        })
    }

    fn parse_located(&self, path: &Path, organisation: &str, directories: &[String]) -> FileOutcome {
        let mut outcome = FileOutcome::default();
        let text = match read_text(path) {
            Ok(text) => text,
            Err(err) => {
                outcome.skips.push(unreadable(&err));
                return outcome;
            }
        };

        let context = FileContext {
            path,
            organisation,
        };
        match self.classify(directories) {
            Some((schema, rule)) => {
                folder::parse_folder_file(&context, schema, rule, &text, &mut outcome);
            }
            None => section::parse_section_file(&context, self.schemas, &text, &mut outcome),
        }

        tracing::debug!(
            path = %path.display(),
            sections = outcome.sections,
            records = outcome.records.len(),
            skipped = outcome.skips.len(),
            "parsed rule file"
        );
        outcome
    }
}

/// File being parsed and the organisation that owns it.
struct FileContext<'a> {
    path: &'a Path,
    organisation: &'a str,
}

impl FileContext<'_> {
    /// Builds a record from column values, keeping only the schema's
    /// columns and enforcing required ones.
    fn record(
        &self,
        schema: &RuleSchema,
        values: Vec<(&str, FieldValue)>,
    ) -> std::result::Result<RuleRecord, SkipReason> {
        let mut record = RuleRecord::new(&schema.name, self.organisation, self.path);
        for (column, value) in values {
            if schema.column(column).is_some() && !value.is_empty() {
                record.values.insert(column.to_string(), value);
            }
        }
        let missing = schema.columns.iter().find(|column| {
            column.required
                && !column.is_organisation()
                && record.value(&column.name).is_none_or(FieldValue::is_empty)
        });
        match missing {
            Some(column) => Err(SkipReason::MissingRequiredField {
                field: column.name.clone(),
            }),
            None => Ok(record),
        }
    }
}

fn unreadable(err: &IngestError) -> SkipEntry {
    let message = std::error::Error::source(err)
        .map_or_else(|| err.to_string(), ToString::to_string);
    SkipEntry::new(err.path(), WHOLE_FILE, SkipReason::Unreadable { message })
}
