//! Splits `(<label>) <text>` values into a label column and a text column.

use polars::prelude::DataFrame;
use pri_model::columns::{
    SUB_QUESTION_LABEL, SUB_QUESTION_TEXT, SUB_SUB_QUESTION_LABEL, SUB_SUB_QUESTION_TEXT,
};
use pri_model::{Diagnostic, Diagnostics};
use tracing::info;

use crate::error::Result;
use crate::frame::{put_string_column, required_strings};

/// Result of splitting one value on its first `)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSplit {
    pub label: String,
    /// Text after the first `)`, leading space kept. `None` when there is no `)`.
    pub text: Option<String>,
    /// The label part held a nested `(`.
    pub ambiguous: bool,
}

pub fn split_label(value: &str) -> LabelSplit {
    match value.split_once(')') {
        Some((head, tail)) => LabelSplit {
            label: head.replace('(', ""),
            text: Some(tail.to_string()),
            ambiguous: head.strip_prefix('(').unwrap_or(head).contains('('),
        },
        None => LabelSplit {
            label: value.replace('(', ""),
            text: None,
            ambiguous: false,
        },
    }
}

/// Split `column` in place and append `label_column`.
pub fn split_label_column(
    mut df: DataFrame,
    column: &str,
    label_column: &str,
    diagnostics: &mut Diagnostics,
) -> Result<DataFrame> {
    info!("splitting label from text in column {column}");
    let values = required_strings(&df, column, "labels")?;

    let mut labels = Vec::with_capacity(values.len());
    let mut texts = Vec::with_capacity(values.len());
    let mut ambiguous = 0usize;
    for value in &values {
        match value.as_deref().map(split_label) {
            Some(split) => {
                if split.ambiguous {
                    ambiguous += 1;
                }
                labels.push(Some(split.label));
                texts.push(split.text);
            }
            None => {
                labels.push(None);
                texts.push(None);
            }
        }
    }

    if ambiguous > 0 {
        diagnostics.record(Diagnostic::AmbiguousLabelSplit {
            column: column.to_string(),
            count: ambiguous,
        });
    }

    put_string_column(&mut df, label_column, labels)?;
    put_string_column(&mut df, column, texts)?;
    Ok(df)
}

/// Split both sub-question levels.
pub fn split_labels(df: DataFrame, diagnostics: &mut Diagnostics) -> Result<DataFrame> {
    let df = split_label_column(df, SUB_QUESTION_TEXT, SUB_QUESTION_LABEL, diagnostics)?;
    split_label_column(df, SUB_SUB_QUESTION_TEXT, SUB_SUB_QUESTION_LABEL, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_bracket() {
        let split = split_label("(A) Listed equity");
        assert_eq!(split.label, "A");
        assert_eq!(split.text.as_deref(), Some(" Listed equity"));
        assert!(!split.ambiguous);
    }

    #[test]
    fn later_brackets_stay_in_text() {
        let split = split_label("(A) Stewardship, excluding (proxy) voting");
        assert_eq!(split.label, "A");
        assert_eq!(
            split.text.as_deref(),
            Some(" Stewardship, excluding (proxy) voting")
        );
    }

    #[test]
    fn value_without_bracket_is_all_label() {
        let split = split_label("Externally managed");
        assert_eq!(split.label, "Externally managed");
        assert_eq!(split.text, None);
    }

    #[test]
    fn nested_bracket_is_ambiguous() {
        let split = split_label("(A(1)) x");
        assert_eq!(split.label, "A1");
        assert!(split.ambiguous);
    }
}
