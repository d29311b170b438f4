mod common;

use common::{Answer, date_rows, frame, some, strings};
use polars::prelude::{DataFrame, DataType};
use pri_model::{Diagnostic, Diagnostics, EnrichmentRule, QuestionType, QuestionnaireRules, ValueColumn};
use pri_transform::{
    JoinPolicy, TransformError, apply_rule, default_rules, drop_consumed_indicators,
    enrich_profile, extract_profile, link_report_ids, split_reserved_group,
};

/// Profile and linked answer table for the given non-reserved rows.
fn prepare(
    respondents: &[&'static str],
    answers: Vec<Answer>,
    rules: &QuestionnaireRules,
) -> (DataFrame, DataFrame) {
    let mut rows = Vec::new();
    for name in respondents {
        rows.extend(date_rows(name, Some("31"), Some("12"), Some("2022")));
    }
    rows.extend(answers);
    let (reserved, rest) = split_reserved_group(&frame(&rows), rules).unwrap();
    let profile = extract_profile(&reserved, rules).unwrap().profile;
    let linked = link_report_ids(&rest, &profile).unwrap();
    (profile, linked)
}

fn rule(target: &str, indicator: &str) -> EnrichmentRule {
    EnrichmentRule {
        target: target.to_string(),
        indicator: indicator.to_string(),
        question_type: None,
        question_text: None,
        sub_question_text: None,
        sub_sub_question_text: None,
        value: None,
        answer_map: None,
    }
}

#[test]
fn yes_no_answers_become_booleans() {
    let rules = default_rules().unwrap();
    let (profile, answers) = prepare(
        &["Acme", "Beta", "Gamma"],
        vec![
            Answer::selected("Acme", "OO 2").sub("(A) Yes"),
            Answer::selected("Beta", "OO 2").sub("(B) No"),
        ],
        &rules,
    );
    let has = rules
        .enrichment
        .iter()
        .find(|r| r.target == "OO2_has_subsidiaries")
        .unwrap();

    let mut diagnostics = Diagnostics::new();
    let enriched = apply_rule(
        profile,
        &answers,
        has,
        &rules,
        JoinPolicy::Lenient,
        &mut diagnostics,
    )
    .unwrap();

    assert!(diagnostics.is_empty());
    let column = enriched.column("OO2_has_subsidiaries").unwrap();
    assert_eq!(column.dtype(), &DataType::Boolean);
    let values: Vec<Option<bool>> = column.bool().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some(true), Some(false), None]);
}

#[test]
fn unmapped_answer_keeps_text_and_reports() {
    let rules = default_rules().unwrap();
    let (profile, answers) = prepare(
        &["Acme", "Beta"],
        vec![
            Answer::selected("Acme", "OO 2").sub("(A) Yes"),
            Answer::selected("Beta", "OO 2").sub("(C) Not sure"),
        ],
        &rules,
    );
    let has = rules
        .enrichment
        .iter()
        .find(|r| r.target == "OO2_has_subsidiaries")
        .unwrap();

    let mut diagnostics = Diagnostics::new();
    let enriched = apply_rule(
        profile,
        &answers,
        has,
        &rules,
        JoinPolicy::Lenient,
        &mut diagnostics,
    )
    .unwrap();

    assert_eq!(
        strings(&enriched, "OO2_has_subsidiaries"),
        some(&["true", "(C) Not sure"])
    );
    assert_eq!(
        diagnostics.into_vec(),
        vec![Diagnostic::UnmappedAnswer {
            target: "OO2_has_subsidiaries".to_string(),
            value: "(C) Not sure".to_string(),
            count: 1,
        }]
    );
}

#[test]
fn derived_value_column_and_filters() {
    let rules = default_rules().unwrap();
    let (profile, answers) = prepare(
        &["Acme"],
        vec![
            Answer::selected("Acme", "OO 4")
                .typed("Money")
                .sub("(C) AUM subject to execution, advisory, custody, or research advisory only")
                .public("1,000"),
            Answer::selected("Acme", "OO 4").typed("Text").public("1.08"),
        ],
        &rules,
    );
    let (enriched, diagnostics) =
        enrich_profile(profile, &answers, &rules, JoinPolicy::Lenient).unwrap();

    assert!(diagnostics.is_empty());
    assert_eq!(strings(&enriched, "OO4_AUM_exec"), some(&["1,000"]));
    assert_eq!(strings(&enriched, "OO4_AUM_FX_Rate"), some(&["1.08"]));
    assert_eq!(strings(&enriched, "OO4_AUM_org"), vec![None]);
}

#[test]
fn applying_a_rule_twice_is_idempotent() {
    let rules = default_rules().unwrap();
    let (profile, answers) = prepare(
        &["Acme", "Beta"],
        vec![Answer::selected("Beta", "OO 3").typed("Text").public("2024")],
        &rules,
    );
    let fundraising = rules
        .enrichment
        .iter()
        .find(|r| r.target == "OO3_fundraising_end_date")
        .unwrap();

    let mut diagnostics = Diagnostics::new();
    let once = apply_rule(
        profile,
        &answers,
        fundraising,
        &rules,
        JoinPolicy::Lenient,
        &mut diagnostics,
    )
    .unwrap();
    let twice = apply_rule(
        once.clone(),
        &answers,
        fundraising,
        &rules,
        JoinPolicy::Lenient,
        &mut diagnostics,
    )
    .unwrap();

    assert_eq!(once.width(), twice.width());
    assert!(once.equals_missing(&twice));
    assert_eq!(
        strings(&twice, "OO3_fundraising_end_date"),
        vec![None, Some("2024".to_string())]
    );
}

#[test]
fn duplicate_keys_keep_first_match_when_lenient() {
    let rules = default_rules().unwrap();
    let (profile, answers) = prepare(
        &["Acme"],
        vec![
            Answer::selected("Acme", "OO 3").typed("Text").public("first"),
            Answer::selected("Acme", "OO 3").typed("Text").public("second"),
        ],
        &rules,
    );
    let (enriched, diagnostics) =
        enrich_profile(profile, &answers, &rules, JoinPolicy::Lenient).unwrap();

    assert_eq!(enriched.height(), 1);
    assert_eq!(strings(&enriched, "OO3_fundraising_end_date"), some(&["first"]));
    let kinds = diagnostics.counts_by_kind();
    assert_eq!(kinds.get("duplicate_join_key"), Some(&1));
    // two right-hand rows for one profile row
    assert_eq!(kinds.get("join_multiplicity"), Some(&1));
}

#[test]
fn duplicate_keys_fail_when_strict() {
    let rules = default_rules().unwrap();
    let (profile, answers) = prepare(
        &["Acme"],
        vec![
            Answer::selected("Acme", "OO 3").typed("Text").public("first"),
            Answer::selected("Acme", "OO 3").typed("Text").public("second"),
        ],
        &rules,
    );
    let err = enrich_profile(profile, &answers, &rules, JoinPolicy::Strict).unwrap_err();
    assert!(matches!(
        err,
        TransformError::DuplicateJoinKey { ref target, duplicated_keys: 1 }
            if target == "OO3_fundraising_end_date"
    ));
}

#[test]
fn multi_choice_rule_is_skipped() {
    let rules = default_rules().unwrap();
    let (profile, answers) = prepare(&["Acme"], Vec::new(), &rules);
    let mut multi = rule("OO9_activities", "OO 9");
    multi.question_type = Some(QuestionType::MultiChoice);

    let width = profile.width();
    let mut diagnostics = Diagnostics::new();
    let enriched = apply_rule(
        profile,
        &answers,
        &multi,
        &rules,
        JoinPolicy::Lenient,
        &mut diagnostics,
    )
    .unwrap();

    assert_eq!(enriched.width(), width);
    assert_eq!(diagnostics.of_kind("unsupported_question_type").count(), 1);
}

#[test]
fn explicit_value_column_is_used() {
    let rules = default_rules().unwrap();
    let (profile, answers) = prepare(
        &["Acme"],
        vec![
            Answer::selected("Acme", "OO 7")
                .sub("(A) Listed equity")
                .sub_sub("Emerging markets")
                .sub_sub_sub("(3) 25-50%"),
        ],
        &rules,
    );
    let mut emerging = rule("emerging", "OO 7");
    emerging.sub_question_text = Some("(A) Listed equity".to_string());
    emerging.value = Some(ValueColumn::SubSubSubQuestionText);

    let mut diagnostics = Diagnostics::new();
    let enriched = apply_rule(
        profile,
        &answers,
        &emerging,
        &rules,
        JoinPolicy::Lenient,
        &mut diagnostics,
    )
    .unwrap();
    assert_eq!(strings(&enriched, "emerging"), some(&["(3) 25-50%"]));
}

#[test]
fn consumed_indicators_are_removed() {
    let rules = default_rules().unwrap();
    let (_, answers) = prepare(
        &["Acme"],
        vec![
            Answer::selected("Acme", "OO 2").sub("(A) Yes"),
            Answer::selected("Acme", "OO 7").sub("(A) Listed equity"),
            Answer::selected("Acme", "OO 10").sub("(A) Stewardship"),
        ],
        &rules,
    );
    let kept = drop_consumed_indicators(&answers, &rules).unwrap();
    assert_eq!(strings(&kept, "indicator"), some(&["OO 10"]));
}
