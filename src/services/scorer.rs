use chrono::{DateTime, Utc};

use crate::models::domain::{QuestionResult, Quiz, ResultReport};

/// Reconciles submitted answers against a quiz's answer key.
pub struct Scorer;

impl Scorer {
    /// Score `answers` against `quiz`, positionally.
    ///
    /// Missing positions count as unanswered and incorrect. Matching is exact
    /// and case-sensitive. A quiz with no questions scores 0%.
    pub fn score(
        username: &str,
        quiz: &Quiz,
        answers: &[String],
        completed_at: DateTime<Utc>,
    ) -> ResultReport {
        let detailed_results: Vec<QuestionResult> = quiz
            .questions
            .iter()
            .enumerate()
            .map(|(i, question)| {
                let user_answer = answers.get(i).cloned();
                let is_correct = user_answer.as_deref() == Some(question.correct_answer.as_str());

                QuestionResult {
                    question: question.question.clone(),
                    user_answer,
                    correct_answer: question.correct_answer.clone(),
                    is_correct,
                    difficulty: question.difficulty,
                }
            })
            .collect();

        let total_questions = detailed_results.len();
        let correct_answers = detailed_results.iter().filter(|r| r.is_correct).count();

        ResultReport {
            username: username.to_string(),
            filename: quiz.source_filename.clone(),
            started_at: quiz.started_at,
            completed_at,
            total_questions,
            correct_answers,
            score_percentage: Self::percentage(correct_answers, total_questions),
            detailed_results,
        }
    }

    pub fn percentage(correct: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        100.0 * correct as f64 / total as f64
    }
}
