//! Distinct question definitions.

use std::collections::HashSet;

use polars::prelude::DataFrame;
use pri_model::columns::CATALOG_COLUMNS;
use tracing::info;

use crate::error::Result;
use crate::frame::{filter_rows, row_keys};

/// Project onto the catalog columns and keep the first occurrence of each
/// distinct row.
pub fn extract_catalog(df: &DataFrame) -> Result<DataFrame> {
    let keys = row_keys(df, &CATALOG_COLUMNS, "catalog")?;
    let mut seen = HashSet::with_capacity(keys.len());
    let keep: Vec<bool> = keys.iter().map(|key| seen.insert(key)).collect();

    let projected = df.select(CATALOG_COLUMNS)?;
    let catalog = filter_rows(&projected, &keep)?;
    info!(questions = catalog.height(), "question catalog extracted");
    Ok(catalog)
}
