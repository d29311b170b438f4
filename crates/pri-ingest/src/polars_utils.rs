//! Polars value helpers shared by the transform stages.

use polars::prelude::*;

/// Converts a Polars AnyValue to an optional String. Null stays `None`.
pub fn any_to_string(value: AnyValue<'_>) -> Option<String> {
    match value {
        AnyValue::Null => None,
        AnyValue::String(s) => Some(s.to_string()),
        AnyValue::StringOwned(s) => Some(s.to_string()),
        AnyValue::Boolean(b) => Some(if b { "True" } else { "False" }.to_string()),
        other => Some(other.to_string()),
    }
}

/// Reads a String column into owned values.
pub fn string_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let values = df
        .column(name)?
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(values)
}

/// Reads any column as optional strings, whatever its dtype.
pub fn column_as_strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_string(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

/// Returns the string value at `idx`, or `None` for null or missing column.
pub fn cell_string(df: &DataFrame, name: &str, idx: usize) -> Option<String> {
    df.column(name)
        .ok()
        .and_then(|column| column.get(idx).ok())
        .and_then(any_to_string)
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}
