//! Errors that stop an export run.

use thiserror::Error;

use nbn_ingest::IngestError;
use nbn_output::OutputError;

use crate::config::ConfigError;

/// Fatal run errors. Everything below the organisation level is reported as
/// a skip entry instead.
#[derive(Debug, Error)]
pub enum RunError {
    /// The input root is missing, not a directory or unreadable.
    #[error("invalid input root: {source}")]
    Input {
        #[source]
        source: IngestError,
    },

    /// The output directory is missing, not a directory or read-only.
    #[error("invalid output directory: {source}")]
    Output {
        #[source]
        source: OutputError,
    },

    /// A CSV file could not be written under the abort policy.
    #[error("export aborted: {source}")]
    WriteAborted {
        #[source]
        source: OutputError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RunError {
    /// Sorts an output error into the fatal directory case and the aborted
    /// file case.
    pub(crate) fn from_output(source: OutputError) -> Self {
        if source.is_fatal() {
            Self::Output { source }
        } else {
            Self::WriteAborted { source }
        }
    }
}
