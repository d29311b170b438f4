//! Questionnaire rule types.
//!
//! A rules file describes one questionnaire version: which indicator holds
//! the respondent profile, which columns are administrative, how question
//! groups become profile columns, and which literal text corrections apply.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::columns;
use crate::question::QuestionType;

fn default_reserved_indicator() -> String {
    "OO 1".to_string()
}

fn default_selected_answer() -> String {
    "Selected".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireRules {
    pub name: String,
    /// Indicator whose rows carry the respondent profile.
    #[serde(default = "default_reserved_indicator")]
    pub reserved_indicator: String,
    /// `response_answer` value marking a chosen answer row.
    #[serde(default = "default_selected_answer")]
    pub selected_answer: String,
    /// Columns dropped from the profile.
    #[serde(default)]
    pub administrative_columns: Vec<String>,
    #[serde(default)]
    pub answer_maps: BTreeMap<String, AnswerMap>,
    #[serde(default)]
    pub enrichment: Vec<EnrichmentRule>,
    #[serde(default)]
    pub corrections: Corrections,
}

impl QuestionnaireRules {
    /// Indicators consumed by enrichment, in first-use order.
    pub fn consumed_indicators(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for rule in &self.enrichment {
            if !seen.contains(&rule.indicator.as_str()) {
                seen.push(rule.indicator.as_str());
            }
        }
        seen
    }

    pub fn answer_map(&self, name: &str) -> Option<&AnswerMap> {
        self.answer_maps.get(name)
    }
}

/// Exact-literal mapping of answer text to booleans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerMap {
    #[serde(default)]
    pub true_values: Vec<String>,
    #[serde(default)]
    pub false_values: Vec<String>,
}

impl AnswerMap {
    pub fn lookup(&self, value: &str) -> Option<bool> {
        if self.true_values.iter().any(|v| v == value) {
            Some(true)
        } else if self.false_values.iter().any(|v| v == value) {
            Some(false)
        } else {
            None
        }
    }
}

/// Source column holding the value of an enrichment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueColumn {
    PublicResponse,
    SubQuestionText,
    SubSubQuestionText,
    SubSubSubQuestionText,
}

impl ValueColumn {
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::PublicResponse => columns::PUBLIC_RESPONSE,
            Self::SubQuestionText => columns::SUB_QUESTION_TEXT,
            Self::SubSubQuestionText => columns::SUB_SUB_QUESTION_TEXT,
            Self::SubSubSubQuestionText => columns::SUB_SUB_SUB_QUESTION_TEXT,
        }
    }

    /// Value column implied by a question type, when one exists.
    pub fn for_question_type(question_type: &QuestionType) -> Option<Self> {
        match question_type {
            QuestionType::Text | QuestionType::Money | QuestionType::Percentage => {
                Some(Self::PublicResponse)
            }
            QuestionType::SingleChoice => Some(Self::SubQuestionText),
            QuestionType::MultiChoice | QuestionType::Other(_) => None,
        }
    }
}

/// One profile column built from a question group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRule {
    pub target: String,
    pub indicator: String,
    #[serde(default)]
    pub question_type: Option<QuestionType>,
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub sub_question_text: Option<String>,
    #[serde(default)]
    pub sub_sub_question_text: Option<String>,
    #[serde(default)]
    pub value: Option<ValueColumn>,
    /// Name of an entry in `answer_maps`.
    #[serde(default)]
    pub answer_map: Option<String>,
}

impl EnrichmentRule {
    /// Explicit value column, else the one implied by the question type.
    pub fn resolve_value(&self) -> Option<ValueColumn> {
        self.value
            .or_else(|| self.question_type.as_ref().and_then(ValueColumn::for_question_type))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corrections {
    #[serde(default)]
    pub question: Vec<QuestionCorrection>,
    #[serde(default)]
    pub sub_question: Vec<SubQuestionCorrection>,
}

impl Corrections {
    pub fn len(&self) -> usize {
        self.question.len() + self.sub_question.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rewrites a misfiled question text and its sub-question text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCorrection {
    pub indicator: String,
    pub question_text: String,
    pub new_question_text: String,
    pub new_sub_question_text: String,
}

/// Literal substring replacement inside `sub_question_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubQuestionCorrection {
    pub indicator: String,
    pub find: String,
    pub replace: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_map_lookup_is_exact() {
        let map = AnswerMap {
            true_values: vec!["(A) Yes".to_string()],
            false_values: vec!["(B) No".to_string()],
        };
        assert_eq!(map.lookup("(A) Yes"), Some(true));
        assert_eq!(map.lookup("(B) No"), Some(false));
        assert_eq!(map.lookup("(A) yes"), None);
    }

    #[test]
    fn value_column_follows_question_type() {
        assert_eq!(
            ValueColumn::for_question_type(&QuestionType::Money),
            Some(ValueColumn::PublicResponse)
        );
        assert_eq!(
            ValueColumn::for_question_type(&QuestionType::SingleChoice),
            Some(ValueColumn::SubQuestionText)
        );
        assert_eq!(ValueColumn::for_question_type(&QuestionType::MultiChoice), None);
    }

    #[test]
    fn explicit_value_overrides_question_type() {
        let rule = EnrichmentRule {
            target: "OO7_x".to_string(),
            indicator: "OO 7".to_string(),
            question_type: Some(QuestionType::SingleChoice),
            question_text: None,
            sub_question_text: None,
            sub_sub_question_text: None,
            value: Some(ValueColumn::SubSubSubQuestionText),
            answer_map: None,
        };
        assert_eq!(rule.resolve_value(), Some(ValueColumn::SubSubSubQuestionText));
    }
}
