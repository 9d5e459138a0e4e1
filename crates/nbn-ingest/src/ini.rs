//! Reader for the INI dialect used by NBN Record Cleaner rule files.
//!
//! The files are close to Python `configparser` input: `#`/`;` comments,
//! indented continuation lines, repeated section headers that merge, and
//! (for list-style files) bare keys or `,` as the key/value separator.
//! Entries are kept in file order so multi-valued keys survive.

use thiserror::Error;

/// Syntax accepted for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IniOptions {
    /// Characters that split a key from its value; the first one found wins.
    pub delimiters: &'static [char],
    /// Treat a line without a delimiter as a key with an empty value.
    pub allow_no_value: bool,
}

impl IniOptions {
    /// `key = value` or `key: value`.
    pub const STANDARD: Self = Self {
        delimiters: &['=', ':'],
        allow_no_value: false,
    };

    /// `key = value`, `key,value` or a bare `key`.
    pub const LIST_STYLE: Self = Self {
        delimiters: &['=', ','],
        allow_no_value: true,
    };
}

impl Default for IniOptions {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Syntax error with its 1-based line number.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IniError {
    #[error("line {line}: entry outside of any section")]
    EntryOutsideSection { line: usize },

    #[error("line {line}: invalid section header '{text}'")]
    InvalidHeader { line: usize, text: String },

    #[error("line {line}: expected a key/value delimiter in '{text}'")]
    MissingDelimiter { line: usize, text: String },

    #[error("line {line}: empty key")]
    EmptyKey { line: usize },
}

impl IniError {
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::EntryOutsideSection { line }
            | Self::InvalidHeader { line, .. }
            | Self::MissingDelimiter { line, .. }
            | Self::EmptyKey { line } => *line,
        }
    }
}

/// A named section and its entries in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    name: String,
    entries: Vec<(String, String)>,
}

impl IniSection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last value of `key`; keys compare ignoring ASCII case.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Every value of `key`, in file order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

/// Parsed INI file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<IniSection>,
}

impl IniDocument {
    /// Parses `text`, failing on the first syntax error.
    pub fn parse(text: &str, options: IniOptions) -> Result<Self, IniError> {
        let mut sections: Vec<IniSection> = Vec::new();
        let mut current: Option<usize> = None;
        // A value continues on indented lines, across blank lines, until the
        // next entry or header.
        let mut continuing = false;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indented = raw.starts_with(char::is_whitespace);
            if indented && continuing {
                if let Some((_, value)) = current
                    .and_then(|idx| sections.get_mut(idx))
                    .and_then(|section| section.entries.last_mut())
                {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(trimmed);
                }
                continue;
            }

            if trimmed.starts_with('[') {
                let name = parse_header(trimmed).ok_or_else(|| IniError::InvalidHeader {
                    line,
                    text: trimmed.to_string(),
                })?;
                let position = match sections.iter().position(|s| s.name == name) {
                    Some(position) => position,
                    None => {
                        sections.push(IniSection::new(name));
                        sections.len() - 1
                    }
                };
                current = Some(position);
                continuing = false;
                continue;
            }

            let Some(section) = current.and_then(|idx| sections.get_mut(idx)) else {
                return Err(IniError::EntryOutsideSection { line });
            };
            let (key, value) = split_entry(trimmed, options).ok_or_else(|| {
                IniError::MissingDelimiter {
                    line,
                    text: trimmed.to_string(),
                }
            })?;
            if key.is_empty() {
                return Err(IniError::EmptyKey { line });
            }
            section.entries.push((key.to_string(), value.to_string()));
            continuing = true;
        }

        Ok(Self { sections })
    }

    #[must_use]
    pub fn sections(&self) -> &[IniSection] {
        &self.sections
    }

    /// Section by exact (case-sensitive) name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|section| section.name == name)
    }

    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(IniSection::name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn parse_header(line: &str) -> Option<&str> {
    let end = line.rfind(']')?;
    let name = line.get(1..end)?.trim();
    if name.is_empty() { None } else { Some(name) }
}

fn split_entry(line: &str, options: IniOptions) -> Option<(&str, &str)> {
    match line.find(|c: char| options.delimiters.contains(&c)) {
        Some(position) => {
            // delimiters are single-byte ASCII
            let key = line[..position].trim();
            let value = line[position + 1..].trim();
            Some((key, value))
        }
        None if options.allow_no_value => Some((line, "")),
        None => None,
    }
}
