//! Respondent profile extraction from the reserved question group.
//!
//! One profile row is kept per respondent: the row carrying the `Date`
//! sub-sub-question, or the first selected row when a respondent has no
//! such row. The day, month and year answers are folded into a single
//! `day/month/year` value and every profile row receives a dense
//! `report_ID` in file arrival order.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use polars::prelude::*;
use pri_model::columns::{
    IDENTITY_COLUMNS, REPORT_ID, RESPONSE_ANSWER, SIGNATORY_NAME, SUB_SUB_QUESTION_TEXT,
    SUB_SUB_SUB_QUESTION_TEXT, YEAR_END_DATE,
};
use pri_model::{DatePart, Diagnostic, Diagnostics, QuestionnaireRules};
use tracing::{info, info_span};

use crate::error::Result;
use crate::frame::{equals_mask, filter_rows, put_string_column, required_strings, row_keys};

const STAGE: &str = "profile";

/// Profile table and the diagnostics raised while building it.
#[derive(Debug)]
pub struct ProfileOutput {
    pub profile: DataFrame,
    pub diagnostics: Diagnostics,
}

/// Split the loaded table into (reserved group rows, remaining rows).
pub fn split_reserved_group(
    df: &DataFrame,
    rules: &QuestionnaireRules,
) -> Result<(DataFrame, DataFrame)> {
    crate::frame::partition_by_value(
        df,
        pri_model::columns::INDICATOR,
        &rules.reserved_indicator,
    )
}

#[derive(Debug, Default)]
struct DateParts {
    /// `Some(value)` once a row for the part has been seen.
    day: Option<Option<String>>,
    month: Option<Option<String>>,
    year: Option<Option<String>>,
    first_row: usize,
    has_date_row: bool,
}

impl DateParts {
    fn slot(&mut self, part: DatePart) -> &mut Option<Option<String>> {
        match part {
            DatePart::Day => &mut self.day,
            DatePart::Month => &mut self.month,
            DatePart::Year => &mut self.year,
        }
    }

    fn value(&self, part: DatePart) -> Option<&str> {
        let slot = match part {
            DatePart::Day => &self.day,
            DatePart::Month => &self.month,
            DatePart::Year => &self.year,
        };
        slot.as_ref().and_then(|value| value.as_deref())
    }

    fn missing(&self) -> Vec<DatePart> {
        DatePart::ALL
            .into_iter()
            .filter(|part| self.value(*part).is_none())
            .collect()
    }

    fn composite(&self) -> Option<String> {
        match (
            self.value(DatePart::Day),
            self.value(DatePart::Month),
            self.value(DatePart::Year),
        ) {
            (Some(day), Some(month), Some(year)) => Some(format!("{day}/{month}/{year}")),
            _ => None,
        }
    }
}

fn date_part(label: Option<&str>) -> Option<DatePart> {
    DatePart::ALL
        .into_iter()
        .find(|part| label == Some(part.label()))
}

/// Build the respondent profile from the reserved group rows.
pub fn extract_profile(reserved: &DataFrame, rules: &QuestionnaireRules) -> Result<ProfileOutput> {
    let span = info_span!("profile", rows = reserved.height());
    let _guard = span.enter();
    let start = Instant::now();
    let mut diagnostics = Diagnostics::new();

    let selected_mask = equals_mask(reserved, RESPONSE_ANSWER, &rules.selected_answer)?;
    let selected = filter_rows(reserved, &selected_mask)?;

    let names = required_strings(&selected, SIGNATORY_NAME, STAGE)?;
    let labels = required_strings(&selected, SUB_SUB_QUESTION_TEXT, STAGE)?;
    let answers = required_strings(&selected, SUB_SUB_SUB_QUESTION_TEXT, STAGE)?;

    let mut groups: BTreeMap<Option<String>, DateParts> = BTreeMap::new();
    for (idx, name) in names.iter().enumerate() {
        let parts = groups.entry(name.clone()).or_insert_with(|| DateParts {
            first_row: idx,
            ..DateParts::default()
        });
        if let Some(part) = date_part(labels[idx].as_deref()) {
            if part == DatePart::Day {
                parts.has_date_row = true;
            }
            let slot = parts.slot(part);
            if slot.is_none() {
                *slot = Some(answers[idx].clone());
            }
        }
    }

    let mut arrival: Vec<(&Option<String>, &DateParts)> = groups.iter().collect();
    arrival.sort_by_key(|(_, parts)| parts.first_row);

    let mut dates: HashMap<Option<String>, Option<String>> = HashMap::new();
    for (name, parts) in arrival {
        let composite = parts.composite();
        if composite.is_none() {
            diagnostics.record(Diagnostic::MissingDatePart {
                respondent: name.clone().unwrap_or_default(),
                missing: parts.missing(),
            });
        }
        dates.insert(name.clone(), composite);
    }

    let anchors: Vec<bool> = (0..selected.height())
        .map(|idx| {
            let is_date = labels[idx].as_deref() == Some(DatePart::Day.label());
            let group = &groups[&names[idx]];
            is_date || (!group.has_date_row && group.first_row == idx)
        })
        .collect();
    let mut profile = filter_rows(&selected, &anchors)?;

    let profile_dates: Vec<Option<String>> = names
        .iter()
        .zip(&anchors)
        .filter(|(_, anchor)| **anchor)
        .map(|(name, _)| dates.get(name).cloned().flatten())
        .collect();
    put_string_column(&mut profile, SUB_SUB_SUB_QUESTION_TEXT, profile_dates)?;

    for column in &rules.administrative_columns {
        if pri_ingest::has_column(&profile, column) {
            profile = profile.drop(column)?;
        } else {
            diagnostics.record(Diagnostic::MissingColumn {
                stage: STAGE.to_string(),
                column: column.clone(),
            });
        }
    }
    if pri_ingest::has_column(&profile, SUB_SUB_SUB_QUESTION_TEXT) {
        profile.rename(SUB_SUB_SUB_QUESTION_TEXT, YEAR_END_DATE.into())?;
    }

    check_unique_respondents(&profile, &mut diagnostics)?;

    let ids: Vec<u32> = (1..=profile.height() as u32).collect();
    profile.with_column(Series::new(REPORT_ID.into(), ids))?;

    info!(
        respondents = profile.height(),
        diagnostics = diagnostics.len(),
        duration_ms = start.elapsed().as_millis(),
        "profile complete"
    );
    Ok(ProfileOutput {
        profile,
        diagnostics,
    })
}

/// Flag identity tuples that occur on more than one profile row.
fn check_unique_respondents(profile: &DataFrame, diagnostics: &mut Diagnostics) -> Result<()> {
    let keys = row_keys(profile, &IDENTITY_COLUMNS, STAGE)?;
    let mut order: Vec<&Vec<Option<String>>> = Vec::new();
    let mut counts: HashMap<&Vec<Option<String>>, usize> = HashMap::new();
    for key in &keys {
        let count = counts.entry(key).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    let mut duplicated = 0usize;
    for key in order {
        let occurrences = counts[key];
        if occurrences > 1 {
            duplicated += 1;
            diagnostics.record(Diagnostic::DuplicateRespondent {
                identity: key.clone(),
                occurrences,
            });
        }
    }
    if duplicated == 0 {
        info!("all signatories are unique");
    }
    Ok(())
}
