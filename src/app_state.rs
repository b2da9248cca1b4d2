use std::sync::Arc;

use chrono::Duration;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{HistoryRepository, MongoHistoryRepository},
    services::{
        generation_client::{GeminiClient, TextGenerator},
        quiz_service::QuizService,
        quiz_session::QuizSessionStore,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub config: Arc<Config>,
    pub db: Database,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let history_repository = Arc::new(MongoHistoryRepository::new(
            &db,
            &config.quiz_results_collection,
        ));
        history_repository.ensure_indexes().await?;

        let generator = Arc::new(GeminiClient::new(&config.generation));

        Self::from_parts(config, db, generator, history_repository)
    }

    /// Assembles the state from already-constructed collaborators.
    pub fn from_parts(
        config: Config,
        db: Database,
        generator: Arc<dyn TextGenerator>,
        history: Arc<dyn HistoryRepository>,
    ) -> AppResult<Self> {
        let sessions =
            QuizSessionStore::new(Duration::minutes(config.quiz.session_ttl_minutes));
        let quiz_service = Arc::new(QuizService::new(
            config.quiz.clone(),
            generator,
            sessions,
            history,
        )?);

        Ok(Self {
            quiz_service,
            config: Arc::new(config),
            db,
        })
    }
}
