//! Row selection and column replacement helpers.

use polars::prelude::*;
use pri_ingest::string_values;

use crate::error::{Result, TransformError};

/// Keep rows whose mask entry is `true`, preserving order.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Mask of rows where `column` equals `value`. Nulls never match.
pub fn equals_mask(df: &DataFrame, column: &str, value: &str) -> Result<Vec<bool>> {
    Ok(required_strings(df, column, "select")?
        .iter()
        .map(|cell| cell.as_deref() == Some(value))
        .collect())
}

/// Split `df` into (rows equal to `value`, all other rows).
pub fn partition_by_value(
    df: &DataFrame,
    column: &str,
    value: &str,
) -> Result<(DataFrame, DataFrame)> {
    let mask = equals_mask(df, column, value)?;
    let inverse: Vec<bool> = mask.iter().map(|keep| !keep).collect();
    Ok((filter_rows(df, &mask)?, filter_rows(df, &inverse)?))
}

/// Read a String column, mapping absence to a stage-tagged error.
pub fn required_strings(
    df: &DataFrame,
    column: &str,
    stage: &'static str,
) -> Result<Vec<Option<String>>> {
    if !pri_ingest::has_column(df, column) {
        return Err(TransformError::MissingColumn {
            stage,
            column: column.to_string(),
        });
    }
    Ok(string_values(df, column)?)
}

/// Insert or replace a String column. Existing columns keep their position.
pub fn put_string_column(
    df: &mut DataFrame,
    name: &str,
    values: Vec<Option<String>>,
) -> Result<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

/// Composite key over several String columns for each row.
pub fn row_keys(df: &DataFrame, columns: &[&str], stage: &'static str) -> Result<Vec<Vec<Option<String>>>> {
    let mut per_column = Vec::with_capacity(columns.len());
    for column in columns {
        per_column.push(required_strings(df, column, stage)?);
    }
    let keys = (0..df.height())
        .map(|idx| per_column.iter().map(|values| values[idx].clone()).collect())
        .collect();
    Ok(keys)
}
