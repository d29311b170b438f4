//! Column names of the Organisation Overview export.
//!
//! Header strings are matched exactly, including the stray spaces around
//! the public response column.

pub const SIGNATORY_NAME: &str = "Signatory Name";
pub const SIGNATORY_CATEGORY: &str = "signatory_category";
pub const AUM_BAND: &str = "aum_band";
pub const PEERING_COUNTRY: &str = "Peering Country";
pub const REGION: &str = "region";
pub const SIGTYPE: &str = "sigtype";

pub const MODULE_SHORT: &str = "module_short";
pub const QUESTION_TYPE: &str = "question_type_pri";
pub const INDICATOR: &str = "indicator";
pub const CORE_PLUS: &str = "Core/Plus";
pub const QUESTION_TEXT: &str = "question_text";
pub const SUB_QUESTION_TEXT: &str = "sub_question_text";
pub const SUB_SUB_QUESTION_TEXT: &str = "sub_sub_question_text";
pub const SUB_SUB_SUB_QUESTION_TEXT: &str = "sub_sub_sub_question_text";
pub const RESPONSE_ANSWER: &str = "response_answer";
pub const PUBLIC_RESPONSE: &str = " Signatory_Public_Response ";

/// Dense respondent key added by profile extraction.
pub const REPORT_ID: &str = "report_ID";
/// Composite `day/month/year` date derived from the reserved group.
pub const YEAR_END_DATE: &str = "OO1_year_end_date";
pub const SUB_QUESTION_LABEL: &str = "sub_question_label";
pub const SUB_SUB_QUESTION_LABEL: &str = "sub_sub_question_label";

/// Attribute tuple that identifies one respondent.
pub const IDENTITY_COLUMNS: [&str; 6] = [
    SIGNATORY_NAME,
    SIGNATORY_CATEGORY,
    AUM_BAND,
    PEERING_COUNTRY,
    REGION,
    SIGTYPE,
];

/// Descriptive columns projected into the question catalog.
pub const CATALOG_COLUMNS: [&str; 8] = [
    MODULE_SHORT,
    QUESTION_TYPE,
    INDICATOR,
    CORE_PLUS,
    QUESTION_TEXT,
    SUB_QUESTION_TEXT,
    SUB_SUB_QUESTION_TEXT,
    SUB_SUB_SUB_QUESTION_TEXT,
];

/// Columns the pipeline cannot run without.
pub const REQUIRED_COLUMNS: [&str; 16] = [
    SIGNATORY_NAME,
    SIGNATORY_CATEGORY,
    AUM_BAND,
    PEERING_COUNTRY,
    REGION,
    SIGTYPE,
    MODULE_SHORT,
    QUESTION_TYPE,
    INDICATOR,
    CORE_PLUS,
    QUESTION_TEXT,
    SUB_QUESTION_TEXT,
    SUB_SUB_QUESTION_TEXT,
    SUB_SUB_SUB_QUESTION_TEXT,
    RESPONSE_ANSWER,
    PUBLIC_RESPONSE,
];
