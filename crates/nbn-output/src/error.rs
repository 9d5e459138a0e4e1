//! Error types for CSV output.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while writing the export files.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Output directory does not exist.
    #[error("output directory not found: {path}")]
    OutputDirNotFound { path: PathBuf },

    /// Output path exists but is not a directory.
    #[error("output path is not a directory: {path}")]
    OutputDirNotDirectory { path: PathBuf },

    /// Output directory cannot be written to.
    #[error("output directory is read-only: {path}")]
    OutputDirReadOnly { path: PathBuf },

    /// A single CSV file could not be created or written (e.g. it is locked).
    #[error("failed to write {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl OutputError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::OutputDirNotFound { path }
            | Self::OutputDirNotDirectory { path }
            | Self::OutputDirReadOnly { path }
            | Self::FileAccess { path, .. } => path,
        }
    }

    /// True for errors about the output directory as a whole.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::FileAccess { .. })
    }
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
