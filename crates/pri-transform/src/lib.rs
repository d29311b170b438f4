//! Normalization stages for the Organisation Overview export.

pub mod catalog;
pub mod cleanup;
pub mod enrich;
pub mod error;
pub mod format;
pub mod frame;
pub mod labels;
pub mod link;
pub mod profile;
pub mod rules;

pub use catalog::extract_catalog;
pub use cleanup::{CleanupReport, CorrectionCount, apply_corrections};
pub use enrich::{JoinPolicy, apply_rule, drop_consumed_indicators, enrich_profile};
pub use error::{Result, RulesError, TransformError};
pub use format::{LABEL_PATTERN, check_format};
pub use labels::{LabelSplit, split_label, split_label_column, split_labels};
pub use link::link_report_ids;
pub use profile::{ProfileOutput, extract_profile, split_reserved_group};
pub use rules::{DEFAULT_RULES, default_rules, load_rules, parse_rules, resolve_rules, validate_rules};
