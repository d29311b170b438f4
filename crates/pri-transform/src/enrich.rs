//! Enrichment of the respondent profile from question groups.
//!
//! Each [`EnrichmentRule`] selects the chosen answer rows of one indicator,
//! takes one value column from them and left-joins it onto the profile by
//! `report_ID` under the rule's target name.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use polars::prelude::*;
use pri_model::columns::{
    INDICATOR, QUESTION_TEXT, QUESTION_TYPE, REPORT_ID, RESPONSE_ANSWER, SUB_QUESTION_TEXT,
    SUB_SUB_QUESTION_TEXT,
};
use pri_model::{
    AnswerMap, Diagnostic, Diagnostics, EnrichmentRule, QuestionType, QuestionnaireRules,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::error::{Result, RulesError, TransformError};
use crate::frame::{filter_rows, required_strings};

const STAGE: &str = "enrich";
const DUPLICATE_SAMPLE: usize = 5;

/// Handling of answer rows that share a `report_ID` within one rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinPolicy {
    /// Keep the first match and record a diagnostic.
    #[default]
    Lenient,
    /// Abort the run.
    Strict,
}

/// Answer columns read once and shared by every rule.
struct AnswerView {
    report_ids: Vec<Option<u32>>,
    indicator: Vec<Option<String>>,
    response: Vec<Option<String>>,
    question_type: Vec<Option<String>>,
    question_text: Vec<Option<String>>,
    sub_question_text: Vec<Option<String>>,
    sub_sub_question_text: Vec<Option<String>>,
    values: HashMap<&'static str, Vec<Option<String>>>,
}

impl AnswerView {
    fn new(answers: &DataFrame, rules: &QuestionnaireRules) -> Result<Self> {
        if !pri_ingest::has_column(answers, REPORT_ID) {
            return Err(TransformError::MissingColumn {
                stage: STAGE,
                column: REPORT_ID.to_string(),
            });
        }
        let report_ids = answers.column(REPORT_ID)?.u32()?.into_iter().collect();

        let mut values = HashMap::new();
        for rule in &rules.enrichment {
            if let Some(value) = rule.resolve_value() {
                let name = value.column_name();
                if !values.contains_key(name) {
                    values.insert(name, required_strings(answers, name, STAGE)?);
                }
            }
        }

        Ok(Self {
            report_ids,
            indicator: required_strings(answers, INDICATOR, STAGE)?,
            response: required_strings(answers, RESPONSE_ANSWER, STAGE)?,
            question_type: required_strings(answers, QUESTION_TYPE, STAGE)?,
            question_text: required_strings(answers, QUESTION_TEXT, STAGE)?,
            sub_question_text: required_strings(answers, SUB_QUESTION_TEXT, STAGE)?,
            sub_sub_question_text: required_strings(answers, SUB_SUB_QUESTION_TEXT, STAGE)?,
            values,
        })
    }

    fn matches(&self, idx: usize, rule: &EnrichmentRule, selected_answer: &str) -> bool {
        fn eq(cell: &Option<String>, expected: &Option<String>) -> bool {
            expected
                .as_deref()
                .is_none_or(|expected| cell.as_deref() == Some(expected))
        }

        self.indicator[idx].as_deref() == Some(rule.indicator.as_str())
            && self.response[idx].as_deref() == Some(selected_answer)
            && rule.question_type.as_ref().is_none_or(|expected| {
                self.question_type[idx]
                    .as_deref()
                    .is_some_and(|cell| QuestionType::parse(cell) == *expected)
            })
            && eq(&self.question_text[idx], &rule.question_text)
            && eq(&self.sub_question_text[idx], &rule.sub_question_text)
            && eq(&self.sub_sub_question_text[idx], &rule.sub_sub_question_text)
    }
}

/// Apply every enrichment rule in file order.
pub fn enrich_profile(
    profile: DataFrame,
    answers: &DataFrame,
    rules: &QuestionnaireRules,
    policy: JoinPolicy,
) -> Result<(DataFrame, Diagnostics)> {
    let span = info_span!("enrich", rules = rules.enrichment.len(), ?policy);
    let _guard = span.enter();
    let start = Instant::now();

    let view = AnswerView::new(answers, rules)?;
    let mut diagnostics = Diagnostics::new();
    let mut profile = profile;
    for rule in &rules.enrichment {
        profile = apply(profile, &view, rule, rules, policy, &mut diagnostics)?;
    }

    info!(
        columns = profile.width(),
        diagnostics = diagnostics.len(),
        duration_ms = start.elapsed().as_millis(),
        "enrichment complete"
    );
    Ok((profile, diagnostics))
}

/// Apply a single rule. Re-applying a rule replaces its target column.
pub fn apply_rule(
    profile: DataFrame,
    answers: &DataFrame,
    rule: &EnrichmentRule,
    rules: &QuestionnaireRules,
    policy: JoinPolicy,
    diagnostics: &mut Diagnostics,
) -> Result<DataFrame> {
    let scoped = QuestionnaireRules {
        enrichment: vec![rule.clone()],
        ..rules.clone()
    };
    let view = AnswerView::new(answers, &scoped)?;
    apply(profile, &view, rule, rules, policy, diagnostics)
}

fn apply(
    mut profile: DataFrame,
    view: &AnswerView,
    rule: &EnrichmentRule,
    rules: &QuestionnaireRules,
    policy: JoinPolicy,
    diagnostics: &mut Diagnostics,
) -> Result<DataFrame> {
    let Some(value_column) = rule.resolve_value() else {
        diagnostics.record(Diagnostic::UnsupportedQuestionType {
            target: rule.target.clone(),
            indicator: rule.indicator.clone(),
            question_type: rule
                .question_type
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        });
        return Ok(profile);
    };
    let Some(values) = view.values.get(value_column.column_name()) else {
        return Err(TransformError::MissingColumn {
            stage: STAGE,
            column: value_column.column_name().to_string(),
        });
    };

    let matched: Vec<usize> = (0..view.report_ids.len())
        .filter(|idx| view.matches(*idx, rule, &rules.selected_answer))
        .collect();

    let left_rows = profile.height();
    if (left_rows as f64) * 1.1 < matched.len() as f64 {
        diagnostics.record(Diagnostic::JoinMultiplicity {
            target: rule.target.clone(),
            left_rows,
            right_rows: matched.len(),
        });
    }

    let mut by_id: HashMap<u32, Option<String>> = HashMap::with_capacity(matched.len());
    let mut duplicated: BTreeMap<u32, usize> = BTreeMap::new();
    for idx in &matched {
        let Some(id) = view.report_ids[*idx] else {
            continue;
        };
        if by_id.contains_key(&id) {
            *duplicated.entry(id).or_insert(0) += 1;
        } else {
            by_id.insert(id, values[*idx].clone());
        }
    }

    if !duplicated.is_empty() {
        if policy == JoinPolicy::Strict {
            return Err(TransformError::DuplicateJoinKey {
                target: rule.target.clone(),
                duplicated_keys: duplicated.len(),
            });
        }
        diagnostics.record(Diagnostic::DuplicateJoinKey {
            target: rule.target.clone(),
            duplicated_keys: duplicated.len(),
            sample: duplicated.keys().take(DUPLICATE_SAMPLE).copied().collect(),
        });
    }

    let joined: Vec<Option<String>> = profile
        .column(REPORT_ID)?
        .u32()?
        .into_iter()
        .map(|id| id.and_then(|id| by_id.get(&id).cloned().flatten()))
        .collect();

    let series = match &rule.answer_map {
        Some(name) => {
            let map = rules
                .answer_map(name)
                .ok_or_else(|| RulesError::UnknownAnswerMap {
                    target: rule.target.clone(),
                    name: name.clone(),
                })?;
            map_answers(&rule.target, joined, map, diagnostics)
        }
        None => Series::new(rule.target.as_str().into(), joined),
    };
    profile.with_column(series)?;

    debug!(
        column = %rule.target,
        indicator = %rule.indicator,
        matched = matched.len(),
        "enrichment rule applied"
    );
    Ok(profile)
}

/// Map answer literals to booleans.
///
/// The column becomes Boolean when every non-null value maps; otherwise it
/// stays String with mapped values rendered `true`/`false`, the spelling the
/// CSV writer uses for Boolean columns.
fn map_answers(
    target: &str,
    values: Vec<Option<String>>,
    map: &AnswerMap,
    diagnostics: &mut Diagnostics,
) -> Series {
    let mut unmapped: BTreeMap<&str, usize> = BTreeMap::new();
    let mapped: Vec<Option<bool>> = values
        .iter()
        .map(|value| {
            value.as_deref().and_then(|value| {
                let hit = map.lookup(value);
                if hit.is_none() {
                    *unmapped.entry(value).or_insert(0) += 1;
                }
                hit
            })
        })
        .collect();

    if unmapped.is_empty() {
        return Series::new(target.into(), mapped);
    }

    for (value, count) in &unmapped {
        diagnostics.record(Diagnostic::UnmappedAnswer {
            target: target.to_string(),
            value: (*value).to_string(),
            count: *count,
        });
    }
    let rendered: Vec<Option<String>> = values
        .iter()
        .zip(&mapped)
        .map(|(value, hit)| match hit {
            Some(flag) => Some(flag.to_string()),
            None => value.clone(),
        })
        .collect();
    Series::new(target.into(), rendered)
}

/// Remove the answer rows of indicators consumed by enrichment.
pub fn drop_consumed_indicators(df: &DataFrame, rules: &QuestionnaireRules) -> Result<DataFrame> {
    let consumed = rules.consumed_indicators();
    let indicators = required_strings(df, INDICATOR, STAGE)?;
    let keep: Vec<bool> = indicators
        .iter()
        .map(|value| {
            value
                .as_deref()
                .is_none_or(|value| !consumed.contains(&value))
        })
        .collect();
    let kept = filter_rows(df, &keep)?;
    info!(
        removed = df.height() - kept.height(),
        indicators = consumed.len(),
        "consumed indicators dropped"
    );
    Ok(kept)
}
