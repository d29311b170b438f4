//! Fixture builders for export-shaped DataFrames.
#![allow(dead_code)]

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use pri_ingest::string_values;

/// One export row; identity attributes other than the name are fixed.
#[derive(Debug, Clone, Default)]
pub struct Answer {
    pub name: &'static str,
    pub indicator: &'static str,
    pub question_type: Option<&'static str>,
    pub question: Option<&'static str>,
    pub sub: Option<&'static str>,
    pub sub_sub: Option<&'static str>,
    pub sub_sub_sub: Option<&'static str>,
    pub response: Option<&'static str>,
    pub public: Option<&'static str>,
}

impl Answer {
    pub fn selected(name: &'static str, indicator: &'static str) -> Self {
        Self {
            name,
            indicator,
            response: Some("Selected"),
            ..Self::default()
        }
    }

    pub fn typed(mut self, question_type: &'static str) -> Self {
        self.question_type = Some(question_type);
        self
    }

    pub fn question(mut self, text: &'static str) -> Self {
        self.question = Some(text);
        self
    }

    pub fn sub(mut self, text: &'static str) -> Self {
        self.sub = Some(text);
        self
    }

    pub fn sub_sub(mut self, text: &'static str) -> Self {
        self.sub_sub = Some(text);
        self
    }

    pub fn sub_sub_sub(mut self, text: &'static str) -> Self {
        self.sub_sub_sub = Some(text);
        self
    }

    pub fn public(mut self, text: &'static str) -> Self {
        self.public = Some(text);
        self
    }

    pub fn not_selected(mut self) -> Self {
        self.response = None;
        self
    }
}

/// Reserved-group rows for a respondent's reporting year end.
pub fn date_rows(
    name: &'static str,
    day: Option<&'static str>,
    month: Option<&'static str>,
    year: Option<&'static str>,
) -> Vec<Answer> {
    let mut rows = Vec::new();
    for (label, value) in [("Date", day), ("Month", month), ("Year", year)] {
        if let Some(value) = value {
            rows.push(
                Answer::selected(name, "OO 1")
                    .typed("Single Choice")
                    .question("Year-end date of the 12-month period for PRI reporting purposes:")
                    .sub_sub(label)
                    .sub_sub_sub(value),
            );
        }
    }
    rows
}

fn column(name: &str, values: Vec<Option<String>>) -> Column {
    Series::new(name.into(), values).into_column()
}

fn text(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

pub fn frame(rows: &[Answer]) -> DataFrame {
    let fixed = |value: &str| -> Vec<Option<String>> {
        rows.iter().map(|_| Some(value.to_string())).collect()
    };
    let pick = |f: fn(&Answer) -> Option<&'static str>| -> Vec<Option<String>> {
        rows.iter().map(|row| text(f(row))).collect()
    };

    DataFrame::new(vec![
        column("UID", rows.iter().enumerate().map(|(i, _)| Some(format!("U{i}"))).collect()),
        column("Signatory Name", pick(|r| Some(r.name))),
        column("signatory_category", fixed("Investment manager")),
        column("aum_band", fixed("US$ 1-10bn")),
        column("Peering Country", fixed("France")),
        column("region", fixed("Europe")),
        column("sigtype", fixed("IM")),
        column("module_short", fixed("OO")),
        column("section", fixed("Organisational information")),
        column("subsection", fixed("Reporting year")),
        column("question_type_pri", pick(|r| r.question_type)),
        column("indicator", pick(|r| Some(r.indicator))),
        column("Core/Plus", fixed("Core")),
        column("question_text", pick(|r| r.question)),
        column("sub_question_text", pick(|r| r.sub)),
        column("sub_sub_question_text", pick(|r| r.sub_sub)),
        column("sub_sub_sub_question_text", pick(|r| r.sub_sub_sub)),
        column("response_group_text", fixed("group")),
        column("response_answer", pick(|r| r.response)),
        column(" Signatory_Public_Response ", pick(|r| r.public)),
        column("Column2", fixed("x")),
    ])
    .expect("fixture frame")
}

pub fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    string_values(df, name).expect("string column")
}

pub fn some(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some((*v).to_string())).collect()
}
