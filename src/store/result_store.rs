// src/store/result_store.rs

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::test_result::{NewTestAnswer, NewTestResult, TestAnswer, TestResult},
};

/// Persistence for finished tests.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Writes a result and all of its answers as one unit of work.
    /// Either every row commits or none does; returns the new result id.
    async fn insert_with_answers(
        &self,
        result: &NewTestResult,
        answers: &[NewTestAnswer],
    ) -> Result<i64, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<TestResult>, AppError>;

    /// Results of one user, most recently completed first.
    async fn find_by_user(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<TestResult>, AppError>;

    /// Answers of one result in the order they were written.
    async fn answers_for(&self, result_id: i64) -> Result<Vec<TestAnswer>, AppError>;
}

#[derive(Debug, Clone)]
pub struct SqlResultStore {
    pool: SqlitePool,
}

impl SqlResultStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn persistence(e: sqlx::Error) -> AppError {
    AppError::PersistenceFailure(e.to_string())
}

#[async_trait]
impl ResultStore for SqlResultStore {
    async fn insert_with_answers(
        &self,
        result: &NewTestResult,
        answers: &[NewTestAnswer],
    ) -> Result<i64, AppError> {
        // Dropping the transaction without commit rolls it back.
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let result_id = sqlx::query(
            r#"
            INSERT INTO test_results
                (user_id, exam_type, score, total_questions, correct_answers, time_taken, completed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(result.user_id)
        .bind(result.exam_type.as_str())
        .bind(result.score)
        .bind(result.total_questions)
        .bind(result.correct_answers)
        .bind(result.time_taken)
        .bind(result.completed_at)
        .execute(&mut *tx)
        .await
        .map_err(persistence)?
        .last_insert_rowid();

        for answer in answers {
            sqlx::query(
                r#"
                INSERT INTO test_answers (test_result_id, question_id, user_answer, is_correct)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(result_id)
            .bind(answer.question_id)
            .bind(&answer.user_answer)
            .bind(answer.is_correct)
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;
        }

        tx.commit().await.map_err(persistence)?;

        tracing::debug!(
            "Stored test result {} with {} answers",
            result_id,
            answers.len()
        );
        Ok(result_id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<TestResult>, AppError> {
        let result = sqlx::query_as::<_, TestResult>(
            r#"
            SELECT id, user_id, exam_type, score, total_questions, correct_answers, time_taken, completed_at
            FROM test_results
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(result)
    }

    async fn find_by_user(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<TestResult>, AppError> {
        // SQLite treats a negative LIMIT as "no limit".
        let results = sqlx::query_as::<_, TestResult>(
            r#"
            SELECT id, user_id, exam_type, score, total_questions, correct_answers, time_taken, completed_at
            FROM test_results
            WHERE user_id = ?
            ORDER BY completed_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch results of user {}: {:?}", user_id, e);
            AppError::from(e)
        })?;
        Ok(results)
    }

    async fn answers_for(&self, result_id: i64) -> Result<Vec<TestAnswer>, AppError> {
        let answers = sqlx::query_as::<_, TestAnswer>(
            r#"
            SELECT id, test_result_id, question_id, user_answer, is_correct
            FROM test_answers
            WHERE test_result_id = ?
            ORDER BY id
            "#,
        )
        .bind(result_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::models::question::ExamType;
    use crate::store::testutil::{insert_questions, insert_user, memory_pool};

    fn new_result(user_id: i64, completed_offset_secs: i64) -> NewTestResult {
        NewTestResult {
            user_id,
            exam_type: ExamType::Icfes,
            score: 50.0,
            total_questions: 2,
            correct_answers: 1,
            time_taken: 30,
            completed_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
                + Duration::seconds(completed_offset_secs),
        }
    }

    fn answer(question_id: i64, user_answer: &str, is_correct: bool) -> NewTestAnswer {
        NewTestAnswer {
            question_id,
            user_answer: user_answer.to_string(),
            is_correct,
        }
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn stores_result_with_answers_in_order() {
        let pool = memory_pool().await;
        let user = insert_user(&pool, "ana").await;
        let q = insert_questions(&pool, ExamType::Icfes, &["A", "B"]).await;
        let store = SqlResultStore::new(pool.clone());

        let id = store
            .insert_with_answers(
                &new_result(user, 0),
                &[answer(q[1], "B", true), answer(q[0], "", false)],
            )
            .await
            .unwrap();

        let stored = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.user_id, user);
        assert_eq!(stored.exam_type, ExamType::Icfes);
        assert_eq!(stored.score, 50.0);
        assert_eq!(stored.completed_at, new_result(user, 0).completed_at);

        let answers = store.answers_for(id).await.unwrap();
        let order: Vec<i64> = answers.iter().map(|a| a.question_id).collect();
        assert_eq!(order, vec![q[1], q[0]]);
        assert!(answers.iter().all(|a| a.test_result_id == id));
        assert_eq!(answers[1].user_answer, "");
        assert!(!answers[1].is_correct);
    }

    #[tokio::test]
    async fn failed_answer_insert_rolls_back_the_result() {
        let pool = memory_pool().await;
        let user = insert_user(&pool, "ana").await;
        let q = insert_questions(&pool, ExamType::Icfes, &["A"]).await;
        let store = SqlResultStore::new(pool.clone());

        // Second answer points at a question that does not exist.
        let err = store
            .insert_with_answers(
                &new_result(user, 0),
                &[answer(q[0], "A", true), answer(424242, "B", false)],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PersistenceFailure(_)));
        assert_eq!(count(&pool, "test_results").await, 0);
        assert_eq!(count(&pool, "test_answers").await, 0);
    }

    #[tokio::test]
    async fn history_is_newest_first_and_limited() {
        let pool = memory_pool().await;
        let ana = insert_user(&pool, "ana").await;
        let bea = insert_user(&pool, "bea").await;
        let store = SqlResultStore::new(pool.clone());

        for offset in [10, 70, 5, 3600, 61, 0, 120] {
            store
                .insert_with_answers(&new_result(ana, offset), &[])
                .await
                .unwrap();
        }
        store
            .insert_with_answers(&new_result(bea, 99_999), &[])
            .await
            .unwrap();

        let all = store.find_by_user(ana, None).await.unwrap();
        assert_eq!(all.len(), 7);
        assert!(all.iter().all(|r| r.user_id == ana));
        assert!(all.windows(2).all(|w| w[0].completed_at > w[1].completed_at));

        let recent = store.find_by_user(ana, Some(5)).await.unwrap();
        assert_eq!(recent.len(), 5);
        let recent_ids: Vec<i64> = recent.iter().map(|r| r.id).collect();
        let all_ids: Vec<i64> = all.iter().take(5).map(|r| r.id).collect();
        assert_eq!(recent_ids, all_ids);
    }

    #[tokio::test]
    async fn unknown_result_is_none() {
        let store = SqlResultStore::new(memory_pool().await);
        assert!(store.find_by_id(1).await.unwrap().is_none());
        assert!(store.answers_for(1).await.unwrap().is_empty());
    }
}
