use std::path::PathBuf;

use pri_model::Diagnostics;
use pri_transform::CleanupReport;

#[derive(Debug)]
pub struct RunResult {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub tables: Vec<TableSummary>,
    pub diagnostics_path: PathBuf,
    pub diagnostics: Diagnostics,
    pub cleanup: CleanupReport,
}

/// One written output table.
#[derive(Debug, Clone)]
pub struct TableSummary {
    pub name: &'static str,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

impl RunResult {
    pub fn table(&self, name: &str) -> Option<&TableSummary> {
        self.tables.iter().find(|table| table.name == name)
    }
}
