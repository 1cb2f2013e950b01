// src/services/scoring.rs

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    error::AppError,
    models::{question::Question, test_result::NewTestAnswer},
};

/// Aggregate outcome of a graded test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub correct_count: usize,
    pub total: usize,
    /// `correct_count / total * 100`.
    pub score: f64,
}

/// Computes the percentage score from per-question correctness.
/// All-or-nothing per question; no weighting.
pub fn score(outcomes: &[bool]) -> Result<ScoreSummary, AppError> {
    let total = outcomes.len();
    if total == 0 {
        return Err(AppError::DivisionUndefined);
    }

    let correct_count = outcomes.iter().filter(|&&correct| correct).count();
    let score = (correct_count as f64 / total as f64) * 100.0;

    Ok(ScoreSummary {
        correct_count,
        total,
        score,
    })
}

/// Grades every question of a test in its original order.
///
/// Questions without a submitted answer are recorded with an empty answer and
/// count as wrong. Answers are compared case-sensitively and verbatim.
/// `questions` must contain every id in `order`.
pub fn grade(
    order: &[i64],
    answers: &HashMap<i64, String>,
    questions: &HashMap<i64, Question>,
) -> Result<Vec<NewTestAnswer>, AppError> {
    order
        .iter()
        .map(|question_id| {
            let question = questions
                .get(question_id)
                .ok_or_else(|| AppError::NotFound(format!("Question {} not found", question_id)))?;
            let user_answer = answers.get(question_id).cloned().unwrap_or_default();
            let is_correct = user_answer == question.correct_answer;
            Ok(NewTestAnswer {
                question_id: *question_id,
                user_answer,
                is_correct,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::ExamType;

    fn question(id: i64, correct: &str) -> Question {
        Question {
            id,
            exam_type: ExamType::Icfes,
            category: "Matemáticas".into(),
            question_text: format!("Q{}", id),
            option_a: "a".into(),
            option_b: "b".into(),
            option_c: "c".into(),
            option_d: "d".into(),
            correct_answer: correct.into(),
            explanation: None,
        }
    }

    fn bank(pairs: &[(i64, &str)]) -> HashMap<i64, Question> {
        pairs.iter().map(|&(id, c)| (id, question(id, c))).collect()
    }

    #[test]
    fn test_score_perfect() {
        let s = score(&[true, true]).unwrap();
        assert_eq!(s.correct_count, 2);
        assert_eq!(s.score, 100.0);
    }

    #[test]
    fn test_score_half() {
        let s = score(&[true, false]).unwrap();
        assert_eq!(s.correct_count, 1);
        assert_eq!(s.score, 50.0);
    }

    #[test]
    fn test_score_two_of_three() {
        let s = score(&[false, true, true]).unwrap();
        assert_eq!(s.correct_count, 2);
        assert_eq!(s.total, 3);
        assert!((s.score - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_zero() {
        let s = score(&[false, false, false]).unwrap();
        assert_eq!(s.correct_count, 0);
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn test_score_empty_is_undefined() {
        assert!(matches!(score(&[]), Err(AppError::DivisionUndefined)));
    }

    #[test]
    fn test_score_stays_within_bounds() {
        for total in 1..=12usize {
            for correct in 0..=total {
                let outcomes: Vec<bool> = (0..total).map(|i| i < correct).collect();
                let s = score(&outcomes).unwrap();
                assert!((0.0..=100.0).contains(&s.score));
                assert_eq!(s.score, correct as f64 / total as f64 * 100.0);
            }
        }
    }

    #[test]
    fn grade_follows_order_and_fills_unanswered() {
        let questions = bank(&[(1, "B"), (2, "B"), (3, "C")]);
        let answers: HashMap<i64, String> =
            [(1, "A".to_string()), (2, "B".to_string())].into_iter().collect();

        let graded = grade(&[2, 3, 1], &answers, &questions).unwrap();

        let ids: Vec<i64> = graded.iter().map(|a| a.question_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(graded[0].is_correct);
        assert_eq!(graded[1].user_answer, "");
        assert!(!graded[1].is_correct);
        assert_eq!(graded[2].user_answer, "A");
        assert!(!graded[2].is_correct);
    }

    #[test]
    fn grade_is_case_sensitive() {
        let questions = bank(&[(1, "B")]);
        let answers: HashMap<i64, String> = [(1, "b".to_string())].into_iter().collect();
        assert!(!grade(&[1], &answers, &questions).unwrap()[0].is_correct);
    }

    #[test]
    fn grade_ignores_answers_outside_the_test() {
        let questions = bank(&[(1, "A")]);
        let answers: HashMap<i64, String> =
            [(1, "A".to_string()), (99, "A".to_string())].into_iter().collect();
        assert_eq!(grade(&[1], &answers, &questions).unwrap().len(), 1);
    }

    #[test]
    fn grade_reports_missing_question() {
        let questions = bank(&[(1, "A")]);
        assert!(matches!(
            grade(&[1, 2], &HashMap::new(), &questions),
            Err(AppError::NotFound(_))
        ));
    }
}
