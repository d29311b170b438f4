//! Shared types for the Organisation Overview normalizer.

pub mod columns;
pub mod diagnostic;
pub mod question;
pub mod rules;

pub use diagnostic::{DatePart, Diagnostic, Diagnostics, Severity};
pub use question::QuestionType;
pub use rules::{
    AnswerMap, Corrections, EnrichmentRule, QuestionCorrection, QuestionnaireRules,
    SubQuestionCorrection, ValueColumn,
};
