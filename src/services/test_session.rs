// src/services/test_session.rs

//! The test lifecycle: start → answer one question at a time → finish.
//!
//! Every call is a single request. State between calls lives only in the
//! [`SessionStore`], keyed by user id.

use std::collections::HashMap;
use std::sync::Arc;

use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::{ExamType, PublicQuestion},
        test_result::NewTestResult,
        test_session::{
            CurrentQuestion, FinishOutcome, QuestionView, StartedTest, SubmitAnswerRequest,
            TestSession,
        },
    },
    services::scoring,
    store::{QuestionStore, ResultStore, SessionStore},
    utils::{clock::Clock, shuffle::Shuffler},
};

pub struct TestSessionService {
    questions: Arc<dyn QuestionStore>,
    results: Arc<dyn ResultStore>,
    sessions: Arc<dyn SessionStore>,
    shuffler: Arc<dyn Shuffler>,
    clock: Arc<dyn Clock>,
}

impl TestSessionService {
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        results: Arc<dyn ResultStore>,
        sessions: Arc<dyn SessionStore>,
        shuffler: Arc<dyn Shuffler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            questions,
            results,
            sessions,
            shuffler,
            clock,
        }
    }

    /// Starts a new test, discarding any unfinished one for this user.
    pub async fn start_test(&self, user_id: i64, exam_type: &str) -> Result<StartedTest, AppError> {
        let exam_type: ExamType = exam_type.parse()?;

        let mut question_ids: Vec<i64> = self
            .questions
            .find_by_exam_type(exam_type)
            .await?
            .into_iter()
            .map(|q| q.id)
            .collect();

        if question_ids.is_empty() {
            return Err(AppError::NoQuestionsAvailable(exam_type));
        }

        self.shuffler.shuffle(&mut question_ids);

        let session = TestSession::new(user_id, exam_type, question_ids, self.clock.now());
        self.sessions.save(&session).await?;

        tracing::info!(
            "User {} started {} test with {} questions",
            user_id,
            exam_type,
            session.total()
        );

        Ok(StartedTest {
            exam_type,
            total_questions: session.total(),
        })
    }

    /// The question under the cursor, or `ReadyToFinish` once all have been passed.
    pub async fn current_question(&self, user_id: i64) -> Result<CurrentQuestion, AppError> {
        let session = self.active_session(user_id).await?.ok_or(AppError::NoActiveSession)?;

        let Some(question_id) = session.current_question_id() else {
            return Ok(CurrentQuestion::ReadyToFinish);
        };

        let question = self
            .questions
            .find_by_id(question_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question {} not found", question_id)))?;

        Ok(CurrentQuestion::InProgress(QuestionView {
            question: PublicQuestion::from(question),
            question_number: session.cursor + 1,
            total_questions: session.total(),
            time_elapsed: session.elapsed_seconds(self.clock.now()),
        }))
    }

    /// Records an answer and advances the cursor.
    ///
    /// The question id is not checked against the cursor and the answer is not
    /// checked against A–D; both are stored as given.
    pub async fn submit_answer(
        &self,
        user_id: i64,
        req: &SubmitAnswerRequest,
    ) -> Result<(), AppError> {
        let mut session = self.active_session(user_id).await?.ok_or(AppError::NoActiveSession)?;

        req.validate()
            .map_err(|e| AppError::InvalidSubmission(e.to_string()))?;
        let (Some(question_id), Some(answer)) = (req.question_id, req.answer.as_ref()) else {
            return Err(AppError::InvalidSubmission(
                "question_id and answer are required".to_string(),
            ));
        };

        session.record_answer(question_id, answer.clone());
        self.sessions.save(&session).await?;

        tracing::debug!(
            "User {} answered question {} ({}/{})",
            user_id,
            question_id,
            session.cursor,
            session.total()
        );
        Ok(())
    }

    /// Like [`submit_answer`](Self::submit_answer), for a body that may have failed to parse.
    ///
    /// A missing session is reported before any problem with the body.
    pub async fn submit_answer_body(
        &self,
        user_id: i64,
        body: Result<SubmitAnswerRequest, AppError>,
    ) -> Result<(), AppError> {
        match body {
            Ok(req) => self.submit_answer(user_id, &req).await,
            Err(e) => {
                self.active_session(user_id)
                    .await?
                    .ok_or(AppError::NoActiveSession)?;
                Err(e)
            }
        }
    }

    /// Grades and stores the running test.
    ///
    /// Without a running test this is a no-op that reports `NothingToFinish`.
    /// If storing fails the session is left untouched so the user can retry.
    pub async fn finish_test(&self, user_id: i64) -> Result<FinishOutcome, AppError> {
        let Some(session) = self.active_session(user_id).await? else {
            return Ok(FinishOutcome::NothingToFinish);
        };

        let mut questions = HashMap::with_capacity(session.total());
        for &question_id in &session.question_ids {
            let question = self
                .questions
                .find_by_id(question_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Question {} not found", question_id)))?;
            questions.insert(question_id, question);
        }

        let answers = scoring::grade(&session.question_ids, &session.answers, &questions)?;
        let outcomes: Vec<bool> = answers.iter().map(|a| a.is_correct).collect();
        let summary = scoring::score(&outcomes)?;

        let now = self.clock.now();
        let result = NewTestResult {
            user_id,
            exam_type: session.exam_type,
            score: summary.score,
            total_questions: summary.total as i64,
            correct_answers: summary.correct_count as i64,
            time_taken: session.elapsed_seconds(now),
            completed_at: now,
        };

        let result_id = self.results.insert_with_answers(&result, &answers).await?;

        // The result is committed; a stale session must not turn this into an error.
        if let Err(e) = self.sessions.clear(user_id).await {
            tracing::warn!("Failed to clear session of user {} after finishing: {}", user_id, e);
        }

        tracing::info!(
            "User {} finished {} test: {}/{} correct ({:.1}%), result {}",
            user_id,
            session.exam_type,
            summary.correct_count,
            summary.total,
            summary.score,
            result_id
        );

        Ok(FinishOutcome::Finished { result_id })
    }

    /// Loads the user's session, discarding it if it fails validation.
    async fn active_session(&self, user_id: i64) -> Result<Option<TestSession>, AppError> {
        let Some(session) = self.sessions.load(user_id).await? else {
            return Ok(None);
        };

        if let Err(reason) = session.validate_for(user_id) {
            tracing::warn!("Discarding invalid session of user {}: {}", user_id, reason);
            self.sessions.clear(user_id).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }
}
