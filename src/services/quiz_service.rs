use std::sync::Arc;

use chrono::Utc;

use crate::{
    config::QuizConfig,
    errors::{AppError, AppResult},
    models::domain::{Document, QuizQuestion, Quiz, ResultReport},
    repositories::HistoryRepository,
    services::{
        chunker::{context_window, TextChunker},
        extractor::DocumentExtractor,
        generation_client::TextGenerator,
        prompt_builder::PromptBuilder,
        quiz_parser::parse_quiz,
        quiz_session::QuizSessionStore,
        scorer::Scorer,
    },
};

/// Document-to-quiz pipeline and the per-actor quiz lifecycle.
pub struct QuizService {
    extractor: DocumentExtractor,
    chunker: TextChunker,
    prompt_builder: PromptBuilder,
    generator: Arc<dyn TextGenerator>,
    sessions: QuizSessionStore,
    history: Arc<dyn HistoryRepository>,
    config: QuizConfig,
}

impl QuizService {
    pub fn new(
        config: QuizConfig,
        generator: Arc<dyn TextGenerator>,
        sessions: QuizSessionStore,
        history: Arc<dyn HistoryRepository>,
    ) -> AppResult<Self> {
        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)?;

        Ok(Self {
            extractor: DocumentExtractor::new(),
            chunker,
            prompt_builder: PromptBuilder::new(config.question_count),
            generator,
            sessions,
            history,
            config,
        })
    }

    pub fn sessions(&self) -> &QuizSessionStore {
        &self.sessions
    }

    /// Extract text on the blocking pool; the temp file never outlives the call.
    async fn extract_text(&self, document: Document) -> AppResult<String> {
        let extractor = self.extractor.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&document))
            .await
            .map_err(|e| AppError::InternalError(format!("Extraction task failed: {}", e)))?
    }

    /// Runs the full pipeline for an upload and makes the result the actor's
    /// active quiz. Fails before calling the generator when no text is found.
    pub async fn generate_quiz(
        &self,
        actor: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> AppResult<Vec<QuizQuestion>> {
        let document = Document::from_upload(filename, bytes);
        log::info!(
            "Generating quiz for '{}' from '{}' ({} bytes)",
            actor,
            filename,
            document.bytes.len()
        );

        let text = self.extract_text(document).await?;
        if text.is_empty() {
            return Err(AppError::UnreadableDocument(filename.to_string()));
        }

        let chunks = self.chunker.chunk(&text);
        let context = context_window(&chunks, self.config.context_chunk_count);
        log::info!(
            "Extracted {} chars into {} chunks; context window is {} chars",
            text.len(),
            chunks.len(),
            context.len()
        );

        let prompt = self.prompt_builder.build(&context);
        let raw = self.generator.generate(&prompt).await?;
        log::debug!("Raw generation output: {}", raw);

        let questions = parse_quiz(&raw)?;
        self.check_question_count(questions.len())?;

        let quiz = Quiz::new(questions.clone(), filename);
        log::info!(
            "Quiz {} ready for '{}' with {} questions",
            quiz.id,
            actor,
            quiz.question_count()
        );

        if let Some(previous) = self.sessions.put(actor, quiz).await {
            log::debug!("Replaced unsubmitted quiz {} for '{}'", previous.id, actor);
        }

        Ok(questions)
    }

    fn check_question_count(&self, count: usize) -> AppResult<()> {
        if count == 0 {
            return Err(AppError::ParseError(
                "response contained no questions".to_string(),
            ));
        }
        if self.config.enforce_question_count && count != self.config.question_count {
            return Err(AppError::ParseError(format!(
                "expected {} questions, found {}",
                self.config.question_count, count
            )));
        }
        Ok(())
    }

    /// Scores the actor's active quiz and records the result. The quiz is
    /// consumed, so a repeated submission fails with `NoActiveQuiz`.
    pub async fn submit_quiz(&self, actor: &str, answers: &[String]) -> AppResult<ResultReport> {
        let active = self
            .sessions
            .take_and_clear(actor)
            .await
            .ok_or(AppError::NoActiveQuiz)?;

        let report = Scorer::score(actor, &active.quiz, answers, Utc::now());

        if let Err(e) = self.history.append(report.clone()).await {
            let restored = self.sessions.restore(actor, active).await;
            log::error!(
                "Failed to record result for '{}' (quiz restored: {}): {}",
                actor,
                restored,
                e
            );
            return Err(e);
        }

        log::info!(
            "Recorded result for '{}': {}/{} ({:.1}%)",
            actor,
            report.correct_answers,
            report.total_questions,
            report.score_percentage
        );
        Ok(report)
    }

    pub async fn quiz_history(&self, actor: &str) -> AppResult<Vec<ResultReport>> {
        self.history.list_for(actor).await
    }

    /// Abandons the actor's active quiz without recording a result.
    pub async fn discard_quiz(&self, actor: &str) -> bool {
        let discarded = self.sessions.discard(actor).await;
        if discarded {
            log::info!("Discarded active quiz for '{}'", actor);
        }
        discarded
    }
}
