mod common;

use common::{Answer, date_rows, frame, some, strings};
use pri_transform::{default_rules, extract_catalog, extract_profile, link_report_ids, split_reserved_group};

fn ids(df: &polars::prelude::DataFrame) -> Vec<Option<u32>> {
    df.column("report_ID")
        .unwrap()
        .u32()
        .unwrap()
        .into_iter()
        .collect()
}

#[test]
fn answer_rows_receive_their_respondent_id() {
    let rules = default_rules().unwrap();
    let mut rows = date_rows("Acme", Some("31"), Some("12"), Some("2022"));
    rows.extend(date_rows("Beta", Some("30"), Some("06"), Some("2022")));
    rows.push(Answer::selected("Beta", "OO 2").sub("(A) Yes"));
    rows.push(Answer::selected("Acme", "OO 2").sub("(B) No"));
    rows.push(Answer::selected("Nobody", "OO 2").sub("(B) No"));

    let (reserved, rest) = split_reserved_group(&frame(&rows), &rules).unwrap();
    let profile = extract_profile(&reserved, &rules).unwrap().profile;
    let linked = link_report_ids(&rest, &profile).unwrap();

    assert_eq!(linked.height(), 3);
    assert_eq!(ids(&linked), vec![Some(2), Some(1), None]);
}

#[test]
fn duplicated_profile_tuple_does_not_multiply_rows() {
    let rules = default_rules().unwrap();
    let mut rows = date_rows("Acme", Some("31"), Some("12"), Some("2022"));
    rows.extend(date_rows("Acme", Some("31"), Some("12"), Some("2022")));
    rows.push(Answer::selected("Acme", "OO 2").sub("(A) Yes"));

    let (reserved, rest) = split_reserved_group(&frame(&rows), &rules).unwrap();
    let profile = extract_profile(&reserved, &rules).unwrap().profile;
    assert_eq!(profile.height(), 2);

    let linked = link_report_ids(&rest, &profile).unwrap();
    assert_eq!(ids(&linked), vec![Some(1)]);
}

#[test]
fn catalog_keeps_first_occurrence_of_each_question() {
    let rows = vec![
        Answer::selected("Acme", "OO 2").typed("Single Choice").question("Q2").sub("(A) Yes"),
        Answer::selected("Beta", "OO 2").typed("Single Choice").question("Q2").sub("(A) Yes"),
        Answer::selected("Beta", "OO 2").typed("Single Choice").question("Q2").sub("(B) No"),
        Answer::selected("Acme", "OO 1").question("Q1"),
    ];
    let catalog = extract_catalog(&frame(&rows)).unwrap();

    assert_eq!(catalog.width(), 8);
    assert_eq!(catalog.height(), 3);
    assert_eq!(strings(&catalog, "indicator"), some(&["OO 2", "OO 2", "OO 1"]));
    assert_eq!(
        strings(&catalog, "sub_question_text"),
        vec![Some("(A) Yes".to_string()), Some("(B) No".to_string()), None]
    );
}
