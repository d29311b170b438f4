use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, Table};
use tracing::info_span;

use pri_cli::config::{ConfigOverrides, PipelineConfig};
use pri_cli::pipeline::run_pipeline;
use pri_cli::types::RunResult;
use pri_model::QuestionnaireRules;
use pri_transform::resolve_rules;

use crate::cli::{RulesArgs, RunArgs};
use crate::summary::{align_column, apply_table_style, dim_cell, header_cell};

pub fn run_overview(args: &RunArgs) -> Result<RunResult> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    let config = config.apply_overrides(ConfigOverrides {
        input: args.input.clone(),
        output_dir: args.output_dir.clone(),
        encoding: args.encoding.clone(),
        chunk_size: args
            .chunk_size
            .map(|size| usize::try_from(size).unwrap_or(usize::MAX)),
        rules: args.rules.clone(),
        strict_joins: args.strict_joins,
        no_progress: args.no_progress,
    });
    let rules = info_span!("rules").in_scope(|| {
        resolve_rules(config.processing.rules.as_deref()).context("load questionnaire rules")
    })?;
    run_pipeline(&config, &rules)
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let rules = resolve_rules(args.rules.as_deref()).context("load questionnaire rules")?;
    println!("Rule set: {}", rules.name);
    println!(
        "Reserved indicator: {}  Selected answer: {}",
        rules.reserved_indicator, rules.selected_answer
    );
    println!("{}", enrichment_table(&rules));
    println!("{}", corrections_table(&rules));
    Ok(())
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn enrichment_table(rules: &QuestionnaireRules) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Column"),
        header_cell("Indicator"),
        header_cell("Type"),
        header_cell("Filter"),
        header_cell("Value"),
        header_cell("Map"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, rule) in rules.enrichment.iter().enumerate() {
        let filter = [
            rule.question_text.as_deref(),
            rule.sub_question_text.as_deref(),
            rule.sub_sub_question_text.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" / ");
        let value = rule.resolve_value().map(|value| value.column_name().trim());
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&rule.target),
            Cell::new(&rule.indicator),
            optional_cell(rule.question_type.as_ref().map(|kind| kind.as_str())),
            optional_cell(Some(filter.as_str()).filter(|text| !text.is_empty())),
            optional_cell(value),
            optional_cell(rule.answer_map.as_deref()),
        ]);
    }
    table
}

fn corrections_table(rules: &QuestionnaireRules) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Indicator"),
        header_cell("Column"),
        header_cell("Match"),
        header_cell("Replacement"),
    ]);
    apply_table_style(&mut table);
    for correction in &rules.corrections.question {
        table.add_row(vec![
            Cell::new(&correction.indicator),
            Cell::new("question_text"),
            Cell::new(&correction.question_text),
            Cell::new(format!(
                "{} / {}",
                correction.new_question_text, correction.new_sub_question_text
            )),
        ]);
    }
    for correction in &rules.corrections.sub_question {
        table.add_row(vec![
            Cell::new(&correction.indicator),
            Cell::new("sub_question_text"),
            Cell::new(&correction.find),
            Cell::new(&correction.replace),
        ]);
    }
    table
}
