//! Output writers for the normalized tables and the diagnostics report.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::Utc;
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use pri_model::{Diagnostic, Diagnostics, Severity};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub const REPORT_SCHEMA: &str = "pri-overview.diagnostics";
pub const REPORT_SCHEMA_VERSION: u32 = 1;
pub const DIAGNOSTICS_FILE: &str = "diagnostics.json";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("failed to serialize diagnostics: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `df` as CSV with a header row and no index column.
pub fn write_csv_table(output_dir: &Path, file_name: &str, df: &DataFrame) -> Result<PathBuf> {
    ensure_dir(output_dir)?;
    let path = output_dir.join(file_name);
    let mut file = File::create(&path).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    let mut data = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut data)
        .map_err(|err| ReportError::Csv {
            path: path.clone(),
            message: err.to_string(),
        })?;
    info!(path = %path.display(), rows = df.height(), "table written");
    Ok(path)
}

#[derive(Debug, Serialize)]
struct DiagnosticsPayload<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    input: String,
    error_count: usize,
    warning_count: usize,
    counts_by_kind: BTreeMap<&'static str, usize>,
    diagnostics: Vec<DiagnosticJson<'a>>,
}

#[derive(Debug, Serialize)]
struct DiagnosticJson<'a> {
    severity: Severity,
    message: String,
    #[serde(flatten)]
    detail: &'a Diagnostic,
}

/// Write `diagnostics.json` into `output_dir`.
pub fn write_diagnostics_json(
    output_dir: &Path,
    input: &Path,
    diagnostics: &Diagnostics,
) -> Result<PathBuf> {
    ensure_dir(output_dir)?;
    let path = output_dir.join(DIAGNOSTICS_FILE);
    let payload = DiagnosticsPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        input: input.display().to_string(),
        error_count: diagnostics.error_count(),
        warning_count: diagnostics.warning_count(),
        counts_by_kind: diagnostics.counts_by_kind(),
        diagnostics: diagnostics
            .iter()
            .map(|diagnostic| DiagnosticJson {
                severity: diagnostic.severity(),
                message: diagnostic.message(),
                detail: diagnostic,
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(&path, format!("{json}\n")).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), diagnostics = diagnostics.len(), "diagnostics written");
    Ok(path)
}
