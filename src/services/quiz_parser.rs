use serde_json::Value;

use crate::{
    errors::{AppError, AppResult},
    models::domain::quiz_question::{QuizQuestion, OPTIONS_PER_QUESTION},
};

const FENCE: &str = "```";
const FENCE_TAGS: [&str; 2] = ["json", "JSON"];

/// Removes a markdown code fence wrapper, if any.
///
/// Accepts an opening fence with or without a `json` tag and tolerates a
/// missing closing fence. Text without a leading fence is returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(mut body) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };

    for tag in FENCE_TAGS {
        if let Some(rest) = body.strip_prefix(tag) {
            body = rest;
            break;
        }
    }

    let body = body.trim_end();
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

/// Decodes a model response into questions.
///
/// All-or-nothing: the first element that is not a well-formed question
/// rejects the whole response. The number of questions is not checked here.
pub fn parse_quiz(raw: &str) -> AppResult<Vec<QuizQuestion>> {
    let body = strip_code_fence(raw);

    let value: Value = serde_json::from_str(body)
        .map_err(|e| AppError::ParseError(format!("response is not valid JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(AppError::ParseError(
            "response is not a JSON array".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| parse_question(index, item))
        .collect()
}

fn parse_question(index: usize, item: Value) -> AppResult<QuizQuestion> {
    let question: QuizQuestion = serde_json::from_value(item)
        .map_err(|e| AppError::ParseError(format!("question {}: {}", index + 1, e)))?;

    if question.options.len() != OPTIONS_PER_QUESTION {
        return Err(AppError::ParseError(format!(
            "question {}: expected {} options, found {}",
            index + 1,
            OPTIONS_PER_QUESTION,
            question.options.len()
        )));
    }

    if !question.has_valid_answer() {
        return Err(AppError::ParseError(format!(
            "question {}: correct_answer '{}' is not one of the options",
            index + 1,
            question.correct_answer
        )));
    }

    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::Difficulty;
    use crate::test_utils::fixtures::questions_json;
    use serde_json::json;

    #[test]
    fn strips_tagged_fence() {
        assert_eq!(strip_code_fence("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fence("  ```JSON\n[]\n```  \n"), "[]");
    }

    #[test]
    fn strips_untagged_fence_and_missing_closer() {
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fence("```json\n[]"), "[]");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fence("  [] \n"), "[]");
    }

    #[test]
    fn parses_ten_questions_in_order() {
        let raw = questions_json(10).to_string();
        let questions = parse_quiz(&raw).expect("valid quiz should parse");

        assert_eq!(questions.len(), 10);
        for (i, q) in questions.iter().enumerate() {
            assert_eq!(q.question, format!("Question {}?", i + 1));
        }
    }

    #[test]
    fn parses_fenced_response() {
        let raw = format!("```json\n{}\n```", questions_json(10));
        assert_eq!(parse_quiz(&raw).unwrap().len(), 10);
    }

    #[test]
    fn question_count_is_not_validated() {
        let raw = questions_json(9).to_string();
        assert_eq!(parse_quiz(&raw).unwrap().len(), 9);
    }

    #[test]
    fn rejects_invalid_json() {
        let result = parse_quiz("Here are your questions: [");
        assert!(matches!(result, Err(AppError::ParseError(_))));
    }

    #[test]
    fn rejects_non_array() {
        let result = parse_quiz(r#"{"questions": []}"#);
        assert!(matches!(result, Err(AppError::ParseError(msg)) if msg.contains("not a JSON array")));
    }

    #[test]
    fn rejects_missing_field() {
        let raw = json!([{
            "question": "Q?",
            "options": ["A", "B", "C", "D"],
            "correct_answer": "A"
        }])
        .to_string();

        let result = parse_quiz(&raw);
        assert!(matches!(result, Err(AppError::ParseError(msg)) if msg.contains("difficulty")));
    }

    #[test]
    fn rejects_wrong_option_count() {
        let raw = json!([{
            "question": "Q?",
            "options": ["A", "B", "C"],
            "correct_answer": "A",
            "difficulty": "Easy"
        }])
        .to_string();

        let result = parse_quiz(&raw);
        assert!(matches!(result, Err(AppError::ParseError(msg)) if msg.contains("expected 4 options")));
    }

    #[test]
    fn rejects_answer_outside_options() {
        let mut items = questions_json(10);
        items[3]["correct_answer"] = json!("Not an option");

        let result = parse_quiz(&items.to_string());
        assert!(matches!(result, Err(AppError::ParseError(msg)) if msg.starts_with("question 4")));
    }

    #[test]
    fn normalizes_difficulty_spelling() {
        let raw = json!([{
            "question": "Q?",
            "options": ["A", "B", "C", "D"],
            "correct_answer": "D",
            "difficulty": "hard"
        }])
        .to_string();

        assert_eq!(parse_quiz(&raw).unwrap()[0].difficulty, Difficulty::Hard);
    }
}
