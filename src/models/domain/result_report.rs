use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::quiz_question::Difficulty;

/// Outcome of one scored submission. Written once to the history store and
/// never updated.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ResultReport {
    pub username: String,
    pub filename: String,
    #[serde(with = "crate::models::timestamp")]
    pub started_at: DateTime<Utc>,
    #[serde(with = "crate::models::timestamp")]
    pub completed_at: DateTime<Utc>,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub score_percentage: f64,
    pub detailed_results: Vec<QuestionResult>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionResult {
    pub question: String,
    pub user_answer: Option<String>, // None when the position was left unanswered
    pub correct_answer: String,
    pub is_correct: bool,
    pub difficulty: Difficulty,
}
