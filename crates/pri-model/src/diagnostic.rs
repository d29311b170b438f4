//! Data-quality diagnostics.
//!
//! Violations found while normalizing never abort a run. Each one is
//! recorded as a [`Diagnostic`] carrying only the data it needs, logged at
//! error level, and returned to the caller inside [`Diagnostics`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::error;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Output reflects data that is known to be wrong.
    Error,
    /// Output is plausible but should be reviewed.
    Warning,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

/// One of the three parts of the reporting year-end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePart {
    Day,
    Month,
    Year,
}

impl DatePart {
    pub const ALL: [DatePart; 3] = [DatePart::Day, DatePart::Month, DatePart::Year];

    /// Sub-sub-question label carrying this part in the export.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Day => "Date",
            Self::Month => "Month",
            Self::Year => "Year",
        }
    }
}

/// Data-quality violation, each variant carries only its needed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Identity tuple shared by more than one profile row.
    DuplicateRespondent {
        identity: Vec<Option<String>>,
        occurrences: usize,
    },
    /// Respondent without a complete day/month/year triple.
    MissingDatePart {
        respondent: String,
        missing: Vec<DatePart>,
    },
    /// Column expected by a stage is absent from its input.
    MissingColumn { stage: String, column: String },
    /// Right side of an enrichment join is much larger than the profile.
    JoinMultiplicity {
        target: String,
        left_rows: usize,
        right_rows: usize,
    },
    /// Right side of an enrichment join repeats respondent keys.
    DuplicateJoinKey {
        target: String,
        duplicated_keys: usize,
        sample: Vec<u32>,
    },
    /// Answer literal with no entry in the column's answer map.
    UnmappedAnswer {
        target: String,
        value: String,
        count: usize,
    },
    /// Question type with no derivable value column.
    UnsupportedQuestionType {
        target: String,
        indicator: String,
        question_type: String,
    },
    /// Sub-question text not shaped like `(<label>) <text>`.
    MalformedLabel {
        row: usize,
        respondent: Option<String>,
        indicator: Option<String>,
        question_text: Option<String>,
        sub_question_text: Option<String>,
    },
    /// Label part still holds a bracket after splitting on the first `)`.
    AmbiguousLabelSplit { column: String, count: usize },
}

impl Diagnostic {
    /// Stable snake_case name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::DuplicateRespondent { .. } => "duplicate_respondent",
            Diagnostic::MissingDatePart { .. } => "missing_date_part",
            Diagnostic::MissingColumn { .. } => "missing_column",
            Diagnostic::JoinMultiplicity { .. } => "join_multiplicity",
            Diagnostic::DuplicateJoinKey { .. } => "duplicate_join_key",
            Diagnostic::UnmappedAnswer { .. } => "unmapped_answer",
            Diagnostic::UnsupportedQuestionType { .. } => "unsupported_question_type",
            Diagnostic::MalformedLabel { .. } => "malformed_label",
            Diagnostic::AmbiguousLabelSplit { .. } => "ambiguous_label_split",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::JoinMultiplicity { .. } => Severity::Warning,
            Diagnostic::UnmappedAnswer { .. } => Severity::Warning,
            Diagnostic::UnsupportedQuestionType { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Format message with diagnostic-specific data.
    pub fn message(&self) -> String {
        match self {
            Diagnostic::DuplicateRespondent {
                identity,
                occurrences,
            } => format!(
                "Duplicate respondent ({}) appears {} times",
                join_optional(identity),
                occurrences
            ),
            Diagnostic::MissingDatePart {
                respondent,
                missing,
            } => {
                let parts: Vec<&str> = missing.iter().map(DatePart::label).collect();
                format!(
                    "Incorrect date format for Signatory Name {}: missing {}",
                    respondent,
                    parts.join(", ")
                )
            }
            Diagnostic::MissingColumn { stage, column } => {
                format!("Column '{column}' is not in the table ({stage})")
            }
            Diagnostic::JoinMultiplicity {
                target,
                left_rows,
                right_rows,
            } => format!(
                "Join for {target} has more rows on the right ({right_rows}) than the profile ({left_rows})"
            ),
            Diagnostic::DuplicateJoinKey {
                target,
                duplicated_keys,
                sample,
            } => {
                let ids: Vec<String> = sample.iter().map(u32::to_string).collect();
                format!(
                    "Join for {target} matched {duplicated_keys} report_ID values more than once; first match kept (e.g. {})",
                    ids.join(", ")
                )
            }
            Diagnostic::UnmappedAnswer {
                target,
                value,
                count,
            } => format!("Answer '{value}' in {target} has no mapping ({count} rows)"),
            Diagnostic::UnsupportedQuestionType {
                target,
                indicator,
                question_type,
            } => format!(
                "Unsupported question type: {question_type} ({indicator}); column {target} skipped"
            ),
            Diagnostic::MalformedLabel {
                row,
                respondent,
                indicator,
                question_text,
                sub_question_text,
            } => format!(
                "Row {}: '{}' '{}' '{}' '{}' does not match the specified format",
                row,
                respondent.as_deref().unwrap_or(""),
                indicator.as_deref().unwrap_or(""),
                question_text.as_deref().unwrap_or(""),
                sub_question_text.as_deref().unwrap_or("")
            ),
            Diagnostic::AmbiguousLabelSplit { column, count } => format!(
                "Splitting label from text in column {column} needs more than one split point ({count} rows)"
            ),
        }
    }
}

fn join_optional(values: &[Option<String>]) -> String {
    values
        .iter()
        .map(|value| value.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Ordered collection of diagnostics recorded during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it at error level.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        error!(kind = diagnostic.kind(), "{}", diagnostic.message());
        self.items.push(diagnostic);
    }

    /// Append diagnostics that were already logged.
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity() == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
            .count()
    }

    /// Number of diagnostics per kind, sorted by kind name.
    pub fn counts_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for diagnostic in &self.items {
            *counts.entry(diagnostic.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.items.iter().filter(move |d| d.kind() == kind)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
