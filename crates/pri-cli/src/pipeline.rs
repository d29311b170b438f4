//! Normalization pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Ingest**: Load the export and check the required columns
//! 2. **Catalog**: Collect distinct question definitions
//! 3. **Profile**: Split off the reserved group and build one row per respondent
//! 4. **Link**: Attach `report_ID` to every remaining answer row
//! 5. **Enrich**: Merge answer groups onto the profile, drop consumed indicators
//! 6. **Clean**: Text corrections, label format check, label split
//! 7. **Output**: Write the three tables and `diagnostics.json`
//!
//! Each stage takes the output of the previous stage and returns typed results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use pri_ingest::{LoadOptions, load_csv, require_columns};
use pri_model::columns::REQUIRED_COLUMNS;
use pri_model::{Diagnostics, QuestionnaireRules};
use pri_report::{write_csv_table, write_diagnostics_json};
use pri_transform::{
    CleanupReport, JoinPolicy, apply_corrections, check_format, drop_consumed_indicators,
    enrich_profile, extract_catalog, extract_profile, link_report_ids, split_labels,
    split_reserved_group,
};

use crate::config::{OutputConfig, PipelineConfig};
use crate::types::{RunResult, TableSummary};

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Load the export file and require every input column.
pub fn ingest(input: &Path, options: &LoadOptions) -> Result<DataFrame> {
    info_span!("ingest", input = %input.display()).in_scope(|| -> Result<_> {
        let start = Instant::now();
        let df = load_csv(input, options)
            .with_context(|| format!("load {}", input.display()))?;
        require_columns(&df, &REQUIRED_COLUMNS)
            .with_context(|| format!("check columns of {}", input.display()))?;
        info!(
            rows = df.height(),
            columns = df.width(),
            duration_ms = start.elapsed().as_millis(),
            "ingest complete"
        );
        Ok(df)
    })
}

// ============================================================================
// Stage 2: Catalog
// ============================================================================

pub fn catalog(df: &DataFrame) -> Result<DataFrame> {
    info_span!("catalog").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let questions = extract_catalog(df).context("extract question catalog")?;
        info!(
            questions = questions.height(),
            duration_ms = start.elapsed().as_millis(),
            "catalog complete"
        );
        Ok(questions)
    })
}

// ============================================================================
// Stage 3: Profile
// ============================================================================

/// Result of the profile stage.
#[derive(Debug)]
pub struct ProfileStage {
    /// One row per respondent.
    pub profile: DataFrame,
    /// Every row outside the reserved group.
    pub answers: DataFrame,
    pub diagnostics: Diagnostics,
}

pub fn profile(df: &DataFrame, rules: &QuestionnaireRules) -> Result<ProfileStage> {
    info_span!("profile", reserved = %rules.reserved_indicator).in_scope(|| -> Result<_> {
        let start = Instant::now();
        let (reserved, answers) =
            split_reserved_group(df, rules).context("split reserved question group")?;
        let output = extract_profile(&reserved, rules).context("extract respondent profile")?;
        info!(
            respondents = output.profile.height(),
            answers = answers.height(),
            duration_ms = start.elapsed().as_millis(),
            "profile complete"
        );
        Ok(ProfileStage {
            profile: output.profile,
            answers,
            diagnostics: output.diagnostics,
        })
    })
}

// ============================================================================
// Stage 4: Link
// ============================================================================

pub fn link(answers: &DataFrame, profile: &DataFrame) -> Result<DataFrame> {
    info_span!("link").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let linked = link_report_ids(answers, profile).context("link report_ID")?;
        info!(
            rows = linked.height(),
            duration_ms = start.elapsed().as_millis(),
            "link complete"
        );
        Ok(linked)
    })
}

// ============================================================================
// Stage 5: Enrich
// ============================================================================

/// Result of the enrich stage.
#[derive(Debug)]
pub struct EnrichStage {
    pub signatory: DataFrame,
    /// Answer rows left after the merged indicators are removed.
    pub answers: DataFrame,
    pub diagnostics: Diagnostics,
}

pub fn enrich(
    profile: DataFrame,
    answers: &DataFrame,
    rules: &QuestionnaireRules,
    policy: JoinPolicy,
) -> Result<EnrichStage> {
    let (signatory, diagnostics) =
        enrich_profile(profile, answers, rules, policy).context("enrich respondent profile")?;
    let answers = info_span!("drop_consumed").in_scope(|| -> Result<_> {
        drop_consumed_indicators(answers, rules).context("drop merged indicators")
    })?;
    Ok(EnrichStage {
        signatory,
        answers,
        diagnostics,
    })
}

// ============================================================================
// Stage 6: Clean
// ============================================================================

/// Result of the clean stage.
#[derive(Debug)]
pub struct CleanStage {
    pub answers: DataFrame,
    pub cleanup: CleanupReport,
    pub diagnostics: Diagnostics,
}

/// Apply text corrections, then check and split the `(<label>) <text>` columns.
pub fn clean(answers: DataFrame, rules: &QuestionnaireRules) -> Result<CleanStage> {
    info_span!("clean").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let (answers, cleanup) =
            apply_corrections(answers, &rules.corrections).context("apply text corrections")?;
        let mut diagnostics = check_format(&answers).context("check label format")?;
        let answers = split_labels(answers, &mut diagnostics).context("split labels")?;
        info!(
            corrected = cleanup.total_changed(),
            diagnostics = diagnostics.len(),
            duration_ms = start.elapsed().as_millis(),
            "clean complete"
        );
        Ok(CleanStage {
            answers,
            cleanup,
            diagnostics,
        })
    })
}

// ============================================================================
// Stage 7: Output
// ============================================================================

/// Tables handed to the output stage.
#[derive(Debug)]
pub struct OutputTables<'a> {
    pub signatory: &'a DataFrame,
    pub questions: &'a DataFrame,
    pub answers: &'a DataFrame,
}

pub fn output(
    config: &OutputConfig,
    input: &Path,
    tables: &OutputTables<'_>,
    diagnostics: &Diagnostics,
) -> Result<(Vec<TableSummary>, PathBuf)> {
    info_span!("output", dir = %config.dir.display()).in_scope(|| -> Result<_> {
        let start = Instant::now();
        let planned = [
            ("signatory", config.signatory_file.as_str(), tables.signatory),
            ("questions", config.questions_file.as_str(), tables.questions),
            ("answers", config.answers_file.as_str(), tables.answers),
        ];
        let mut written = Vec::with_capacity(planned.len());
        for (name, file_name, df) in planned {
            let path = write_csv_table(&config.dir, file_name, df)
                .with_context(|| format!("write {name} table"))?;
            written.push(TableSummary {
                name,
                path,
                rows: df.height(),
                columns: df.width(),
            });
        }
        let diagnostics_path = write_diagnostics_json(&config.dir, input, diagnostics)
            .context("write diagnostics report")?;
        info!(
            tables = written.len(),
            duration_ms = start.elapsed().as_millis(),
            "output complete"
        );
        Ok((written, diagnostics_path))
    })
}

/// Run every stage against the configured input.
pub fn run_pipeline(config: &PipelineConfig, rules: &QuestionnaireRules) -> Result<RunResult> {
    let input = config
        .input
        .path
        .clone()
        .ok_or_else(|| anyhow!("no input file given (pass INPUT or set [input] path)"))?;
    let span = info_span!("pipeline", rules = %rules.name);
    let _guard = span.enter();
    let start = Instant::now();

    let raw = ingest(&input, &config.load_options())?;
    let questions = catalog(&raw)?;
    let ProfileStage {
        profile,
        answers,
        diagnostics: mut all_diagnostics,
    } = profile(&raw, rules)?;
    drop(raw);

    let linked = link(&answers, &profile)?;
    drop(answers);
    let enriched = enrich(profile, &linked, rules, config.processing.join_policy)?;
    drop(linked);
    all_diagnostics.extend(enriched.diagnostics);

    let cleaned = clean(enriched.answers, rules)?;
    all_diagnostics.extend(cleaned.diagnostics);

    let (tables, diagnostics_path) = output(
        &config.output,
        &input,
        &OutputTables {
            signatory: &enriched.signatory,
            questions: &questions,
            answers: &cleaned.answers,
        },
        &all_diagnostics,
    )?;

    info!(
        errors = all_diagnostics.error_count(),
        warnings = all_diagnostics.warning_count(),
        duration_ms = start.elapsed().as_millis(),
        "pipeline complete"
    );
    Ok(RunResult {
        input,
        output_dir: config.output.dir.clone(),
        tables,
        diagnostics_path,
        diagnostics: all_diagnostics,
        cleanup: cleaned.cleanup,
    })
}
