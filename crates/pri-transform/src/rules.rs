//! Questionnaire rules loading and validation.
//!
//! The 2023 Organisation Overview rule set is embedded at compile time; an
//! alternative questionnaire version can be supplied as a TOML file.

use std::collections::BTreeSet;
use std::path::Path;

use pri_model::QuestionnaireRules;
use tracing::debug;

use crate::error::RulesError;

/// Embedded rule set for the 2023 questionnaire.
pub const DEFAULT_RULES: &str = include_str!("../data/oo_2023.toml");

/// Parse and validate the embedded rule set.
pub fn default_rules() -> Result<QuestionnaireRules, RulesError> {
    parse_rules(DEFAULT_RULES, "embedded oo_2023.toml")
}

/// Load and validate a rules file.
pub fn load_rules(path: &Path) -> Result<QuestionnaireRules, RulesError> {
    let text = std::fs::read_to_string(path).map_err(|source| RulesError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rules(&text, &path.display().to_string())
}

/// Load `path` when given, otherwise the embedded rule set.
pub fn resolve_rules(path: Option<&Path>) -> Result<QuestionnaireRules, RulesError> {
    match path {
        Some(path) => load_rules(path),
        None => default_rules(),
    }
}

pub fn parse_rules(text: &str, origin: &str) -> Result<QuestionnaireRules, RulesError> {
    let rules: QuestionnaireRules = toml::from_str(text).map_err(|source| RulesError::Parse {
        origin: origin.to_string(),
        source: Box::new(source),
    })?;
    validate_rules(&rules)?;
    debug!(
        origin,
        enrichment = rules.enrichment.len(),
        corrections = rules.corrections.len(),
        "rules loaded"
    );
    Ok(rules)
}

pub fn validate_rules(rules: &QuestionnaireRules) -> Result<(), RulesError> {
    let mut targets = BTreeSet::new();
    for (index, rule) in rules.enrichment.iter().enumerate() {
        if rule.target.trim().is_empty() {
            return Err(RulesError::EmptyTarget { index });
        }
        if !targets.insert(rule.target.as_str()) {
            return Err(RulesError::DuplicateTarget {
                target: rule.target.clone(),
            });
        }
        if rule.indicator.trim().is_empty() {
            return Err(RulesError::EmptyIndicator {
                target: rule.target.clone(),
            });
        }
        if rule.value.is_none() && rule.question_type.is_none() {
            return Err(RulesError::NoValueSource {
                target: rule.target.clone(),
            });
        }
        if let Some(name) = &rule.answer_map
            && !rules.answer_maps.contains_key(name)
        {
            return Err(RulesError::UnknownAnswerMap {
                target: rule.target.clone(),
                name: name.clone(),
            });
        }
    }

    for (name, map) in &rules.answer_maps {
        if let Some(value) = map.true_values.iter().find(|v| map.false_values.contains(v)) {
            return Err(RulesError::ConflictingAnswer {
                name: name.clone(),
                value: value.clone(),
            });
        }
    }

    for (index, correction) in rules.corrections.sub_question.iter().enumerate() {
        if correction.find.is_empty() {
            return Err(RulesError::EmptyCorrection {
                index,
                indicator: correction.indicator.clone(),
            });
        }
    }
    Ok(())
}
