//! Error types for the transform stages.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a questionnaire rules file.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read rules file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("enrichment rule #{index} has an empty target")]
    EmptyTarget { index: usize },

    #[error("enrichment target '{target}' is defined more than once")]
    DuplicateTarget { target: String },

    #[error("enrichment target '{target}' has no indicator")]
    EmptyIndicator { target: String },

    #[error("enrichment target '{target}' names neither a value column nor a question type")]
    NoValueSource { target: String },

    #[error("enrichment target '{target}' uses unknown answer map '{name}'")]
    UnknownAnswerMap { target: String, name: String },

    #[error("answer map '{name}' maps '{value}' to both true and false")]
    ConflictingAnswer { name: String, value: String },

    #[error("correction #{index} for {indicator} has an empty search text")]
    EmptyCorrection { index: usize, indicator: String },
}

/// Errors that abort a transform stage.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// Column required by a stage is absent.
    #[error("{stage}: column '{column}' not found")]
    MissingColumn { stage: &'static str, column: String },

    /// Right side of an enrichment join repeats respondent keys.
    #[error("join for {target} matched {duplicated_keys} report_ID values more than once")]
    DuplicateJoinKey {
        target: String,
        duplicated_keys: usize,
    },

    #[error("invalid label pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;
