//! Error taxonomy for a query run

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;

pub type Result<T, E = QueryError> = std::result::Result<T, E>;

/// Problems with the run configuration, raised before anything is loaded.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("thread count must be at least 1, got {0}")]
    InvalidThreadCount(i64),

    #[error("parameter `{name}` is not a YYYY-MM-DD date: {value:?}")]
    InvalidDate { name: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QueryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot open relation file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed reading {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{column} at row {row} is not a number: {value:?}")]
    MalformedNumeric {
        column: &'static str,
        row: usize,
        value: String,
    },

    #[error("column {0} not found or has an unexpected type")]
    MissingColumn(&'static str),

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    #[error("cannot start a worker thread for {stage}: {source}")]
    Spawn { stage: &'static str, source: io::Error },

    #[error("a worker thread panicked during {stage}")]
    WorkerPanicked { stage: &'static str },

    #[error("cannot write result to {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },
}
