//! Error types for survey export ingestion.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Reasons an export file cannot be turned into a table.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("export file does not exist: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not a WHATWG encoding label.
    #[error("unknown text encoding '{label}'")]
    UnknownEncoding { label: String },

    /// Some byte sequence has no mapping in the requested encoding.
    #[error("{path} is not valid {encoding}")]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("malformed record in {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// No header row.
    #[error("export file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    #[error("missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("table construction failed: {message}")]
    DataFrame { message: String },
}

impl From<PolarsError> for IngestError {
    fn from(err: PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
