// src/services/results.rs

use std::sync::Arc;

use crate::{
    error::AppError,
    models::test_result::{AnsweredQuestion, ResultDetail, TestResult},
    store::{QuestionStore, ResultStore},
};

/// Read side for finished tests. Results are private to their owner.
pub struct ResultService {
    results: Arc<dyn ResultStore>,
    questions: Arc<dyn QuestionStore>,
}

impl ResultService {
    pub fn new(results: Arc<dyn ResultStore>, questions: Arc<dyn QuestionStore>) -> Self {
        Self { results, questions }
    }

    /// A result with every answer joined to its question, in storage order.
    pub async fn view_result(&self, user_id: i64, result_id: i64) -> Result<ResultDetail, AppError> {
        let result = self
            .results
            .find_by_id(result_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Result {} not found", result_id)))?;

        if result.user_id != user_id {
            tracing::warn!(
                "User {} tried to read result {} owned by user {}",
                user_id,
                result_id,
                result.user_id
            );
            return Err(AppError::Forbidden(
                "You do not have permission to view these results".to_string(),
            ));
        }

        let stored = self.results.answers_for(result_id).await?;
        let mut answers = Vec::with_capacity(stored.len());
        for answer in stored {
            let question = self
                .questions
                .find_by_id(answer.question_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Question {} not found", answer.question_id))
                })?;
            answers.push(AnsweredQuestion {
                question,
                user_answer: answer.user_answer,
                is_correct: answer.is_correct,
            });
        }

        Ok(ResultDetail { result, answers })
    }

    /// Every result of the user, newest first.
    pub async fn list_history(&self, user_id: i64) -> Result<Vec<TestResult>, AppError> {
        self.results.find_by_user(user_id, None).await
    }

    /// The newest `limit` results of the user.
    pub async fn list_recent(&self, user_id: i64, limit: i64) -> Result<Vec<TestResult>, AppError> {
        self.results.find_by_user(user_id, Some(limit.max(0))).await
    }
}
