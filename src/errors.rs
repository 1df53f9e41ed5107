use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::StageName;

/// Error type for configuration, precondition, IO, and encoding failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage's inputs do not satisfy what it needs (population size,
    /// bundle length, upstream output). Nothing is published for the field.
    #[error("stage '{stage}' failed for field '{field}': {details}")]
    Precondition {
        /// Stage that refused to run.
        stage: StageName,
        /// Field the failure applies to (`*` for the whole run).
        field: String,
        /// Human-readable reason.
        details: String,
    },
    /// Filesystem failure on a known path.
    #[error("io failure on '{}': {source}", path.display())]
    File {
        /// Path being read, written, or renamed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A JSONL line that is not valid JSON.
    #[error("corrupt line {line} in '{}': {details}", path.display())]
    Corrupt {
        /// File containing the line.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Parser message.
        details: String,
    },
    /// IO failure without path context.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// JSON serialization failure.
    #[error("encoding failure: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PipelineError {
    pub(crate) fn precondition(
        stage: StageName,
        field: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::Precondition {
            stage,
            field: field.into(),
            details: details.into(),
        }
    }

    pub(crate) fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}
