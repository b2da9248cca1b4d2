/// Placeholder replaced with the document excerpt.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Placeholder replaced with the number of questions requested.
pub const COUNT_PLACEHOLDER: &str = "{question_count}";

pub const QUIZ_GENERATION_PROMPT: &str = r#"
You are an expert educational AI system. Generate exactly {question_count} multiple-choice questions (MCQs)
from the given context.

### Context:
{context}

### Instructions:
- Generate exactly {question_count} questions
- Each question must have exactly 4 options and one correct answer.
- The correct_answer must be copied verbatim from one of the 4 options.
- Include a difficulty level, one of: Easy, Medium, Hard.
- Return strictly a JSON array and nothing else: no prose before or after it.

[
  {
    "question": "Question text?",
    "options": ["A", "B", "C", "D"],
    "correct_answer": "A",
    "difficulty": "Easy"
  }
]
"#;
