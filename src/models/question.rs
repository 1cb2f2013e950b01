// src/models/question.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::error::AppError;

/// Top-level exam a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamType {
    #[serde(rename = "ICFES")]
    Icfes,
    #[serde(rename = "SaberPro")]
    SaberPro,
}

impl ExamType {
    pub const ALL: [ExamType; 2] = [ExamType::Icfes, ExamType::SaberPro];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Icfes => "ICFES",
            ExamType::SaberPro => "SaberPro",
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match on the stored tag.
impl FromStr for ExamType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ICFES" => Ok(ExamType::Icfes),
            "SaberPro" => Ok(ExamType::SaberPro),
            other => Err(AppError::InvalidExamType(other.to_string())),
        }
    }
}

impl TryFrom<String> for ExamType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    #[sqlx(try_from = "String")]
    pub exam_type: ExamType,

    /// Subject label, e.g. "Matemáticas".
    pub category: String,

    pub question_text: String,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// One of "A".."D".
    pub correct_answer: String,

    /// Shown when reviewing a finished test.
    pub explanation: Option<String>,
}

/// DTO for sending a question while a test is running (excludes answer and explanation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub exam_type: ExamType,
    pub category: String,
    pub question_text: String,
    pub options: [PublicOption; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicOption {
    pub letter: char,
    pub text: String,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        let option = |letter, text| PublicOption { letter, text };
        PublicQuestion {
            id: q.id,
            exam_type: q.exam_type,
            category: q.category,
            question_text: q.question_text,
            options: [
                option('A', q.option_a),
                option('B', q.option_b),
                option('C', q.option_c),
                option('D', q.option_d),
            ],
        }
    }
}

/// A question not yet stored. Used by seeding and tests.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub exam_type: ExamType,
    pub category: String,
    pub question_text: String,
    pub options: [String; 4],
    pub correct_answer: String,
    pub explanation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_type_parsing_is_case_sensitive() {
        assert_eq!("ICFES".parse::<ExamType>().unwrap(), ExamType::Icfes);
        assert_eq!("SaberPro".parse::<ExamType>().unwrap(), ExamType::SaberPro);
        assert!(matches!(
            "icfes".parse::<ExamType>(),
            Err(AppError::InvalidExamType(t)) if t == "icfes"
        ));
        assert!("".parse::<ExamType>().is_err());
    }

    #[test]
    fn exam_type_serializes_as_tag() {
        assert_eq!(
            serde_json::to_string(&ExamType::SaberPro).unwrap(),
            "\"SaberPro\""
        );
        assert_eq!(
            serde_json::from_str::<ExamType>("\"ICFES\"").unwrap(),
            ExamType::Icfes
        );
    }

    #[test]
    fn public_question_hides_answer() {
        let q = Question {
            id: 7,
            exam_type: ExamType::Icfes,
            category: "Ciencias".into(),
            question_text: "Closest planet to the Sun?".into(),
            option_a: "Venus".into(),
            option_b: "Earth".into(),
            option_c: "Mercury".into(),
            option_d: "Mars".into(),
            correct_answer: "C".into(),
            explanation: Some("Mercury orbits closest".into()),
        };

        let public = serde_json::to_value(PublicQuestion::from(q)).unwrap();
        assert_eq!(public["options"][2]["letter"], "C");
        assert_eq!(public["options"][2]["text"], "Mercury");
        assert!(public.get("correct_answer").is_none());
        assert!(public.get("explanation").is_none());
    }
}
