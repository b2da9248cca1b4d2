use serde::Deserialize;
use validator::Validate;

pub const MAX_SUBMITTED_ANSWERS: usize = 100;

/// Body of `POST /submit_quiz`. Answers are positionally aligned with the
/// questions of the active quiz; a shorter list leaves the tail unanswered.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    #[serde(default)]
    #[validate(length(max = 100))]
    pub answers: Vec<String>,
}
