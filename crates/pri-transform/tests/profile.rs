mod common;

use common::{Answer, date_rows, frame, some, strings};
use pri_model::{DatePart, Diagnostic};
use pri_transform::{default_rules, extract_profile, split_reserved_group};

fn rows() -> Vec<Answer> {
    let mut rows = Vec::new();
    rows.extend(date_rows("Acme", Some("31"), Some("12"), Some("2022")));
    rows.extend(date_rows("Beta", Some("30"), Some("06"), Some("2022")));
    rows.push(Answer::selected("Acme", "OO 2").sub("(A) Yes"));
    rows
}

#[test]
fn composite_date_is_literal() {
    let rules = default_rules().unwrap();
    let (reserved, rest) = split_reserved_group(&frame(&rows()), &rules).unwrap();
    assert_eq!(rest.height(), 1);

    let output = extract_profile(&reserved, &rules).unwrap();
    assert!(output.diagnostics.is_empty());
    assert_eq!(
        strings(&output.profile, "OO1_year_end_date"),
        some(&["31/12/2022", "30/06/2022"])
    );
}

#[test]
fn report_ids_follow_arrival_order_and_are_last() {
    let rules = default_rules().unwrap();
    let mut input = date_rows("Zeta", Some("1"), Some("1"), Some("2023"));
    input.extend(date_rows("Alpha", Some("2"), Some("2"), Some("2023")));
    let (reserved, _) = split_reserved_group(&frame(&input), &rules).unwrap();

    let profile = extract_profile(&reserved, &rules).unwrap().profile;
    assert_eq!(strings(&profile, "Signatory Name"), some(&["Zeta", "Alpha"]));
    let ids: Vec<Option<u32>> = profile
        .column("report_ID")
        .unwrap()
        .u32()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(ids, vec![Some(1), Some(2)]);
    let names = profile.get_column_names();
    assert_eq!(names.last().unwrap().as_str(), "report_ID");
}

#[test]
fn administrative_columns_are_dropped() {
    let rules = default_rules().unwrap();
    let (reserved, _) = split_reserved_group(&frame(&rows()), &rules).unwrap();
    let profile = extract_profile(&reserved, &rules).unwrap().profile;

    let names: Vec<String> = profile
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "Signatory Name",
            "signatory_category",
            "aum_band",
            "Peering Country",
            "region",
            "sigtype",
            "Core/Plus",
            "OO1_year_end_date",
            "report_ID",
        ]
    );
}

#[test]
fn missing_date_part_gives_null_date_and_diagnostic() {
    let rules = default_rules().unwrap();
    let input = date_rows("Gamma", Some("31"), None, Some("2022"));
    let (reserved, _) = split_reserved_group(&frame(&input), &rules).unwrap();

    let output = extract_profile(&reserved, &rules).unwrap();
    assert_eq!(strings(&output.profile, "OO1_year_end_date"), vec![None]);
    let diagnostics = output.diagnostics.into_vec();
    assert_eq!(
        diagnostics,
        vec![Diagnostic::MissingDatePart {
            respondent: "Gamma".to_string(),
            missing: vec![DatePart::Month],
        }]
    );
}

#[test]
fn missing_date_parts_are_reported_in_arrival_order() {
    let rules = default_rules().unwrap();
    let mut input = date_rows("Zeta", Some("31"), Some("12"), None);
    input.extend(date_rows("Alpha", None, Some("06"), Some("2022")));
    input.extend(date_rows("Mu", Some("30"), None, Some("2022")));
    let (reserved, _) = split_reserved_group(&frame(&input), &rules).unwrap();

    let output = extract_profile(&reserved, &rules).unwrap();
    let respondents: Vec<String> = output
        .diagnostics
        .iter()
        .filter_map(|diagnostic| match diagnostic {
            Diagnostic::MissingDatePart { respondent, .. } => Some(respondent.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(respondents, vec!["Zeta", "Alpha", "Mu"]);
}

#[test]
fn respondent_without_date_row_is_kept() {
    let rules = default_rules().unwrap();
    let input = date_rows("Delta", None, Some("12"), Some("2022"));
    let (reserved, _) = split_reserved_group(&frame(&input), &rules).unwrap();

    let output = extract_profile(&reserved, &rules).unwrap();
    assert_eq!(output.profile.height(), 1);
    assert_eq!(strings(&output.profile, "Signatory Name"), some(&["Delta"]));
    assert_eq!(output.diagnostics.of_kind("missing_date_part").count(), 1);
}

#[test]
fn unselected_rows_are_ignored() {
    let rules = default_rules().unwrap();
    let mut input = date_rows("Acme", Some("31"), Some("12"), Some("2022"));
    input.push(
        Answer::selected("Acme", "OO 1")
            .sub_sub("Date")
            .sub_sub_sub("01")
            .not_selected(),
    );
    let (reserved, _) = split_reserved_group(&frame(&input), &rules).unwrap();

    let output = extract_profile(&reserved, &rules).unwrap();
    assert_eq!(output.profile.height(), 1);
    assert_eq!(
        strings(&output.profile, "OO1_year_end_date"),
        some(&["31/12/2022"])
    );
}

#[test]
fn duplicate_identity_is_flagged_not_removed() {
    let rules = default_rules().unwrap();
    let mut input = date_rows("Acme", Some("31"), Some("12"), Some("2022"));
    input.extend(date_rows("Acme", Some("30"), Some("06"), Some("2021")));
    let (reserved, _) = split_reserved_group(&frame(&input), &rules).unwrap();

    let output = extract_profile(&reserved, &rules).unwrap();
    assert_eq!(output.profile.height(), 2);
    let duplicates: Vec<_> = output
        .diagnostics
        .of_kind("duplicate_respondent")
        .cloned()
        .collect();
    assert_eq!(duplicates.len(), 1);
    match &duplicates[0] {
        Diagnostic::DuplicateRespondent {
            identity,
            occurrences,
        } => {
            assert_eq!(*occurrences, 2);
            assert_eq!(identity[0].as_deref(), Some("Acme"));
        }
        other => panic!("unexpected diagnostic {other:?}"),
    }
}

#[test]
fn absent_administrative_column_is_reported() {
    let mut rules = default_rules().unwrap();
    rules
        .administrative_columns
        .push("response_detail".to_string());
    let (reserved, _) = split_reserved_group(&frame(&rows()), &rules).unwrap();

    let output = extract_profile(&reserved, &rules).unwrap();
    assert_eq!(
        output.diagnostics.into_vec(),
        vec![Diagnostic::MissingColumn {
            stage: "profile".to_string(),
            column: "response_detail".to_string(),
        }]
    );
}
