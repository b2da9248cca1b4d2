use serde::Serialize;

use crate::models::domain::{QuestionResult, ResultReport};

/// Body returned by `POST /submit_quiz`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitQuizResponse {
    pub score: usize,
    pub total: usize,
    pub percentage: f64,
    pub results: Vec<QuestionResult>,
}

impl From<ResultReport> for SubmitQuizResponse {
    fn from(report: ResultReport) -> Self {
        SubmitQuizResponse {
            score: report.correct_answers,
            total: report.total_questions,
            percentage: report.score_percentage,
            results: report.detailed_results,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscardQuizResponse {
    pub discarded: bool,
}
