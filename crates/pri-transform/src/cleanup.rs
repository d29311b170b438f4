//! Literal text corrections for known export defects.

use polars::prelude::DataFrame;
use pri_model::Corrections;
use pri_model::columns::{INDICATOR, QUESTION_TEXT, SUB_QUESTION_TEXT};
use tracing::{info, info_span};

use crate::error::Result;
use crate::frame::{put_string_column, required_strings};

const STAGE: &str = "cleanup";

/// Cells changed by one correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionCount {
    pub indicator: String,
    pub description: String,
    pub changed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub corrections: Vec<CorrectionCount>,
}

impl CleanupReport {
    pub fn total_changed(&self) -> usize {
        self.corrections.iter().map(|c| c.changed).sum()
    }
}

/// Apply question and sub-question corrections in declaration order.
pub fn apply_corrections(
    mut df: DataFrame,
    corrections: &Corrections,
) -> Result<(DataFrame, CleanupReport)> {
    let span = info_span!("cleanup", rules = corrections.len());
    let _guard = span.enter();

    let indicators = required_strings(&df, INDICATOR, STAGE)?;
    let mut question_text = required_strings(&df, QUESTION_TEXT, STAGE)?;
    let mut sub_question_text = required_strings(&df, SUB_QUESTION_TEXT, STAGE)?;
    let mut report = CleanupReport::default();

    for correction in &corrections.question {
        let mut changed = 0;
        for idx in 0..indicators.len() {
            if indicators[idx].as_deref() == Some(correction.indicator.as_str())
                && question_text[idx].as_deref() == Some(correction.question_text.as_str())
            {
                question_text[idx] = Some(correction.new_question_text.clone());
                sub_question_text[idx] = Some(correction.new_sub_question_text.clone());
                changed += 1;
            }
        }
        info!(indicator = %correction.indicator, changed, "question text corrected");
        report.corrections.push(CorrectionCount {
            indicator: correction.indicator.clone(),
            description: format!("question '{}'", correction.question_text),
            changed,
        });
    }

    for correction in &corrections.sub_question {
        let mut changed = 0;
        for idx in 0..indicators.len() {
            if indicators[idx].as_deref() != Some(correction.indicator.as_str()) {
                continue;
            }
            let replaced = match &sub_question_text[idx] {
                Some(text) if text.contains(&correction.find) => {
                    text.replace(&correction.find, &correction.replace)
                }
                _ => continue,
            };
            sub_question_text[idx] = Some(replaced);
            changed += 1;
        }
        info!(indicator = %correction.indicator, changed, "sub-question text corrected");
        report.corrections.push(CorrectionCount {
            indicator: correction.indicator.clone(),
            description: format!("sub-question '{}'", correction.find),
            changed,
        });
    }

    put_string_column(&mut df, QUESTION_TEXT, question_text)?;
    put_string_column(&mut df, SUB_QUESTION_TEXT, sub_question_text)?;
    info!(changed = report.total_changed(), "cleanup complete");
    Ok((df, report))
}
