//! Error types for rule ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop the ingestion of a folder or file.
///
/// Problems inside a rule file never surface here; they become skip
/// entries instead.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Directory not found.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Path exists but is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::DirectoryNotFound { path }
            | Self::NotADirectory { path }
            | Self::DirectoryRead { path, .. }
            | Self::FileNotFound { path }
            | Self::FileRead { path, .. } => path,
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::DirectoryNotFound {
            path: PathBuf::from("/rules/missing"),
        };
        assert_eq!(err.to_string(), "directory not found: /rules/missing");
        assert_eq!(err.path(), std::path::Path::new("/rules/missing"));
    }
}
