use crate::constants::quiz_prompt::{CONTEXT_PLACEHOLDER, COUNT_PLACEHOLDER, QUIZ_GENERATION_PROMPT};

/// Renders the fixed quiz-generation instructions around a context window.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    question_count: usize,
}

impl PromptBuilder {
    pub fn new(question_count: usize) -> Self {
        Self { question_count }
    }

    pub fn build(&self, context_window: &str) -> String {
        // Count first so a context containing the count placeholder is left untouched.
        QUIZ_GENERATION_PROMPT
            .replace(COUNT_PLACEHOLDER, &self.question_count.to_string())
            .replace(CONTEXT_PLACEHOLDER, context_window)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(10)
    }
}
