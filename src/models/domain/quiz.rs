use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::quiz_question::QuizQuestion;

/// A generated quiz waiting for the actor's answers.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String, // correlates log lines for one generation
    pub questions: Vec<QuizQuestion>,
    pub source_filename: String,
    #[serde(with = "crate::models::timestamp")]
    pub started_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(questions: Vec<QuizQuestion>, source_filename: &str) -> Self {
        Self::started_at(questions, source_filename, Utc::now())
    }

    pub fn started_at(
        questions: Vec<QuizQuestion>,
        source_filename: &str,
        started_at: DateTime<Utc>,
    ) -> Self {
        Quiz {
            id: Uuid::new_v4().to_string(),
            questions,
            source_filename: source_filename.to_string(),
            started_at,
        }
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}
