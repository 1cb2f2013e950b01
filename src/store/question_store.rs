// src/store/question_store.rs

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::question::{ExamType, Question},
};

/// Read access to the question bank.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Every question tagged with `exam_type`, in id order.
    async fn find_by_exam_type(&self, exam_type: ExamType) -> Result<Vec<Question>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Question>, AppError>;
}

const QUESTION_COLUMNS: &str = "id, exam_type, category, question_text, option_a, option_b, \
     option_c, option_d, correct_answer, explanation";

#[derive(Debug, Clone)]
pub struct SqlQuestionStore {
    pool: SqlitePool,
}

impl SqlQuestionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionStore for SqlQuestionStore {
    async fn find_by_exam_type(&self, exam_type: ExamType) -> Result<Vec<Question>, AppError> {
        let sql = format!(
            "SELECT {} FROM questions WHERE exam_type = ? ORDER BY id",
            QUESTION_COLUMNS
        );
        sqlx::query_as::<_, Question>(&sql)
            .bind(exam_type.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch {} questions: {:?}", exam_type, e);
                AppError::from(e)
            })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Question>, AppError> {
        let sql = format!("SELECT {} FROM questions WHERE id = ?", QUESTION_COLUMNS);
        let question = sqlx::query_as::<_, Question>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(question)
    }
}
