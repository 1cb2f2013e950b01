// src/models/test_session.rs

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::models::question::{ExamType, PublicQuestion};

/// A user's in-progress attempt, kept in the session store between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSession {
    pub user_id: i64,
    pub exam_type: ExamType,

    /// Shuffled once at start and never reordered.
    pub question_ids: Vec<i64>,

    /// Index of the next question to show. Equal to `question_ids.len()` when done.
    pub cursor: usize,

    pub started_at: DateTime<Utc>,

    /// Submitted answers keyed by question id, stored verbatim.
    pub answers: HashMap<i64, String>,
}

impl TestSession {
    pub fn new(
        user_id: i64,
        exam_type: ExamType,
        question_ids: Vec<i64>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            exam_type,
            question_ids,
            cursor: 0,
            started_at,
            answers: HashMap::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.question_ids.len()
    }

    /// Id of the question under the cursor, `None` once every slot has been passed.
    pub fn current_question_id(&self) -> Option<i64> {
        self.question_ids.get(self.cursor).copied()
    }

    /// Records an answer and moves the cursor forward by one, stopping at the end.
    pub fn record_answer(&mut self, question_id: i64, answer: String) {
        self.answers.insert(question_id, answer);
        self.cursor = (self.cursor + 1).min(self.question_ids.len());
    }

    /// Whole seconds since the test started, never negative.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_seconds().max(0)
    }

    /// Checks the invariants a stored session must hold before it is trusted.
    pub fn validate_for(&self, user_id: i64) -> Result<(), String> {
        if self.user_id != user_id {
            return Err(format!(
                "session belongs to user {} but was read for user {}",
                self.user_id, user_id
            ));
        }
        if self.question_ids.is_empty() {
            return Err("session has no questions".to_string());
        }
        if self.cursor > self.question_ids.len() {
            return Err(format!(
                "cursor {} is past the end of {} questions",
                self.cursor,
                self.question_ids.len()
            ));
        }
        let unique: HashSet<i64> = self.question_ids.iter().copied().collect();
        if unique.len() != self.question_ids.len() {
            return Err("session contains duplicate question ids".to_string());
        }
        Ok(())
    }
}

/// DTO for submitting one answer.
/// Any non-empty answer text is accepted; it is not checked against A–D.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    /// Accepted as a number or a numeric string, as HTML forms send it.
    #[serde(default, deserialize_with = "number_or_string")]
    #[validate(required(message = "question_id is required"))]
    pub question_id: Option<i64>,

    #[validate(
        required(message = "answer is required"),
        length(min = 1, message = "answer must not be empty")
    )]
    pub answer: Option<String>,
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(id)),
        Some(RawId::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid question_id '{}'", text))),
    }
}

/// Response for a freshly started test.
#[derive(Debug, Clone, Serialize)]
pub struct StartedTest {
    pub exam_type: ExamType,
    pub total_questions: usize,
}

/// The question a user should see next.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub question: PublicQuestion,
    /// 1-based.
    pub question_number: usize,
    pub total_questions: usize,
    pub time_elapsed: i64,
}

/// What `current_question` found.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CurrentQuestion {
    InProgress(QuestionView),
    /// Every question has been passed; the client should call finish.
    ReadyToFinish,
}

/// What `finish_test` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FinishOutcome {
    Finished { result_id: i64 },
    /// No test was running. Nothing was written.
    NothingToFinish,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn session(ids: Vec<i64>) -> TestSession {
        TestSession::new(1, ExamType::Icfes, ids, Utc::now())
    }

    #[test]
    fn cursor_advances_once_per_answer_and_stops_at_end() {
        let mut s = session(vec![10, 20]);
        s.record_answer(10, "A".into());
        assert_eq!(s.cursor, 1);
        // Re-answering an earlier question still advances.
        s.record_answer(10, "B".into());
        assert_eq!(s.cursor, 2);
        s.record_answer(20, "C".into());
        assert_eq!(s.cursor, 2);
        assert_eq!(s.answers.get(&10).map(String::as_str), Some("B"));
        assert_eq!(s.current_question_id(), None);
    }

    #[test]
    fn elapsed_is_floored_to_whole_seconds() {
        let s = session(vec![1]);
        let later = s.started_at + Duration::milliseconds(2_999);
        assert_eq!(s.elapsed_seconds(later), 2);
        assert_eq!(s.elapsed_seconds(s.started_at - Duration::seconds(5)), 0);
    }

    #[test]
    fn validation_rejects_broken_state() {
        assert!(session(vec![1, 2, 3]).validate_for(1).is_ok());
        assert!(session(vec![1, 2, 3]).validate_for(2).is_err());
        assert!(session(vec![]).validate_for(1).is_err());
        assert!(session(vec![4, 4]).validate_for(1).is_err());

        let mut past_end = session(vec![1]);
        past_end.cursor = 2;
        assert!(past_end.validate_for(1).is_err());
    }

    #[test]
    fn session_survives_json_storage() {
        let mut s = session(vec![3, 1, 2]);
        s.record_answer(3, "D".into());
        let raw = serde_json::to_string(&s).unwrap();
        let back: TestSession = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn submit_request_requires_both_fields() {
        let ok = SubmitAnswerRequest {
            question_id: Some(1),
            answer: Some("Z".into()),
        };
        assert!(ok.validate().is_ok());

        let empty_answer = SubmitAnswerRequest {
            question_id: Some(1),
            answer: Some(String::new()),
        };
        assert!(empty_answer.validate().is_err());
        assert!(SubmitAnswerRequest::default().validate().is_err());
    }

    #[test]
    fn question_id_may_arrive_as_text() {
        let req: SubmitAnswerRequest =
            serde_json::from_str(r#"{"question_id":" 12","answer":"A"}"#).unwrap();
        assert_eq!(req.question_id, Some(12));

        let req: SubmitAnswerRequest = serde_json::from_str(r#"{"question_id":7}"#).unwrap();
        assert_eq!(req.question_id, Some(7));
        assert_eq!(req.answer, None);

        let req: SubmitAnswerRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.question_id, None);

        assert!(serde_json::from_str::<SubmitAnswerRequest>(r#"{"question_id":"seven"}"#).is_err());
    }

    #[test]
    fn outcomes_are_tagged() {
        let v = serde_json::to_value(FinishOutcome::Finished { result_id: 9 }).unwrap();
        assert_eq!(v["status"], "finished");
        assert_eq!(v["result_id"], 9);
        let v = serde_json::to_value(CurrentQuestion::ReadyToFinish).unwrap();
        assert_eq!(v["status"], "ready_to_finish");
    }
}
