use std::fmt;

use serde::{Deserialize, Serialize};

/// Answer type declared in `question_type_pri`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    Text,
    Money,
    Percentage,
    SingleChoice,
    MultiChoice,
    Other(String),
}

impl QuestionType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Text" => Self::Text,
            "Money" => Self::Money,
            "Percentage" => Self::Percentage,
            "Single Choice" => Self::SingleChoice,
            "Multi Choice" => Self::MultiChoice,
            other => Self::Other(other.to_string()),
        }
    }

    /// Label as written in the export.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "Text",
            Self::Money => "Money",
            Self::Percentage => "Percentage",
            Self::SingleChoice => "Single Choice",
            Self::MultiChoice => "Multi Choice",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for QuestionType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<QuestionType> for String {
    fn from(value: QuestionType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
