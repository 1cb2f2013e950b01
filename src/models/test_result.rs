// src/models/test_result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::question::{ExamType, Question};

/// Represents the 'test_results' table in the database.
/// One row per finished test; never updated.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestResult {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub exam_type: ExamType,
    /// Percentage in [0, 100].
    pub score: f64,
    pub total_questions: i64,
    pub correct_answers: i64,
    /// Whole seconds between start and finish.
    pub time_taken: i64,
    pub completed_at: DateTime<Utc>,
}

/// Represents the 'test_answers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestAnswer {
    pub id: i64,
    pub test_result_id: i64,
    pub question_id: i64,
    /// Empty when the question was never answered.
    pub user_answer: String,
    pub is_correct: bool,
}

/// A result about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTestResult {
    pub user_id: i64,
    pub exam_type: ExamType,
    pub score: f64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub time_taken: i64,
    pub completed_at: DateTime<Utc>,
}

/// An answer about to be written. The parent id is assigned inside the store transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestAnswer {
    pub question_id: i64,
    pub user_answer: String,
    pub is_correct: bool,
}

/// One reviewed question of a finished test.
#[derive(Debug, Clone, Serialize)]
pub struct AnsweredQuestion {
    pub question: Question,
    pub user_answer: String,
    pub is_correct: bool,
}

/// DTO for the result review page.
#[derive(Debug, Clone, Serialize)]
pub struct ResultDetail {
    pub result: TestResult,
    pub answers: Vec<AnsweredQuestion>,
}
