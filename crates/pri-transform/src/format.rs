//! `(<label>) <text>` format check for sub-question texts.

use polars::prelude::DataFrame;
use pri_model::columns::{INDICATOR, QUESTION_TEXT, SIGNATORY_NAME, SUB_QUESTION_TEXT};
use pri_model::{Diagnostic, Diagnostics};
use regex::Regex;
use tracing::info;

use crate::error::Result;
use crate::frame::required_strings;

/// Expected shape of a labelled sub-question text.
pub const LABEL_PATTERN: &str = r"^\([A-Za-z0-9]+\)\s.+";

const STAGE: &str = "format";

/// Record a `MalformedLabel` for every non-null sub-question text that does
/// not match [`LABEL_PATTERN`]. The table itself is not modified.
pub fn check_format(df: &DataFrame) -> Result<Diagnostics> {
    let pattern = Regex::new(LABEL_PATTERN)?;
    let names = required_strings(df, SIGNATORY_NAME, STAGE)?;
    let indicators = required_strings(df, INDICATOR, STAGE)?;
    let questions = required_strings(df, QUESTION_TEXT, STAGE)?;
    let sub_questions = required_strings(df, SUB_QUESTION_TEXT, STAGE)?;

    let mut diagnostics = Diagnostics::new();
    for (row, sub_question) in sub_questions.iter().enumerate() {
        let Some(text) = sub_question else { continue };
        if pattern.is_match(text) {
            continue;
        }
        diagnostics.record(Diagnostic::MalformedLabel {
            row,
            respondent: names[row].clone(),
            indicator: indicators[row].clone(),
            question_text: questions[row].clone(),
            sub_question_text: Some(text.clone()),
        });
    }

    if diagnostics.is_empty() {
        info!("checked format for column '{SUB_QUESTION_TEXT}'");
    } else {
        info!(malformed = diagnostics.len(), "format check complete");
    }
    Ok(diagnostics)
}
