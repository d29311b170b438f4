//! Propagates `report_ID` from the profile onto answer rows.

use std::collections::HashMap;

use polars::prelude::*;
use pri_model::columns::{IDENTITY_COLUMNS, REPORT_ID};
use tracing::{info, warn};

use crate::error::{Result, TransformError};
use crate::frame::row_keys;

const STAGE: &str = "link";

/// Left-join `report_ID` onto `df` by the identity tuple.
///
/// Unmatched rows keep a null identifier. Null key parts compare equal, and
/// when the profile repeats a tuple the first profile row wins.
pub fn link_report_ids(df: &DataFrame, profile: &DataFrame) -> Result<DataFrame> {
    if !pri_ingest::has_column(profile, REPORT_ID) {
        return Err(TransformError::MissingColumn {
            stage: STAGE,
            column: REPORT_ID.to_string(),
        });
    }
    let profile_keys = row_keys(profile, &IDENTITY_COLUMNS, STAGE)?;
    let profile_ids = profile.column(REPORT_ID)?.u32()?;

    let mut lookup: HashMap<Vec<Option<String>>, u32> = HashMap::with_capacity(profile_keys.len());
    for (key, id) in profile_keys.into_iter().zip(profile_ids.into_iter()) {
        if let Some(id) = id {
            lookup.entry(key).or_insert(id);
        }
    }

    let keys = row_keys(df, &IDENTITY_COLUMNS, STAGE)?;
    let ids: Vec<Option<u32>> = keys.iter().map(|key| lookup.get(key).copied()).collect();
    let unmatched = ids.iter().filter(|id| id.is_none()).count();

    let mut linked = df.clone();
    linked.with_column(Series::new(REPORT_ID.into(), ids))?;

    if unmatched > 0 {
        warn!(unmatched, "rows without a matching respondent profile");
    }
    info!(rows = linked.height(), unmatched, "report_ID linked");
    Ok(linked)
}
