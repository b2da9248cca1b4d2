use std::env;
use std::str::FromStr;

use secrecy::SecretString;

const DEV_JWT_SECRET: &str = "dev_secret_key_change_in_production";
const DEV_GEMINI_API_KEY: &str = "gemini_api_key";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub quiz_results_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: String,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub generation: GenerationConfig,
    pub quiz: QuizConfig,
}

/// Connection settings for the external text-generation endpoint.
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
}

/// Tuning for the document-to-quiz pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub context_chunk_count: usize,
    pub question_count: usize,
    pub enforce_question_count: bool,
    pub session_ttl_minutes: i64,
    pub max_upload_bytes: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1500,
            chunk_overlap: 200,
            context_chunk_count: 3,
            question_count: 10,
            enforce_question_count: false,
            session_ttl_minutes: 60,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let quiz_defaults = QuizConfig::default();

        Self {
            mongo_conn_string: env_or("MONGO_CONN_STRING", "mongodb://localhost:27017"),
            mongo_db_name: env_or("MONGO_DB_NAME", "docquiz-local"),
            quiz_results_collection: env_or("QUIZ_RESULTS_COLLECTION", "quiz_results"),
            web_server_host: env_or("WEB_SERVER_HOST", "localhost"),
            web_server_port: env_parse("WEB_SERVER_PORT", 5000),
            cors_allowed_origin: env_or("CORS_ALLOWED_ORIGIN", "http://localhost:5173"),
            jwt_secret: SecretString::from(env_or("JWT_SECRET", DEV_JWT_SECRET)),
            jwt_expiration_hours: env_parse("JWT_EXPIRATION_HOURS", 24),
            generation: GenerationConfig {
                api_key: SecretString::from(env_or("GEMINI_API_KEY", DEV_GEMINI_API_KEY)),
                base_url: env_or(
                    "GEMINI_BASE_URL",
                    "https://generativelanguage.googleapis.com/v1beta",
                ),
                model: env_or("GEMINI_MODEL", "gemini-2.5-flash"),
            },
            quiz: QuizConfig {
                chunk_size: env_parse("CHUNK_SIZE", quiz_defaults.chunk_size),
                chunk_overlap: env_parse("CHUNK_OVERLAP", quiz_defaults.chunk_overlap),
                context_chunk_count: env_parse(
                    "CONTEXT_CHUNK_COUNT",
                    quiz_defaults.context_chunk_count,
                ),
                question_count: env_parse("QUIZ_QUESTION_COUNT", quiz_defaults.question_count),
                enforce_question_count: env_parse(
                    "ENFORCE_QUESTION_COUNT",
                    quiz_defaults.enforce_question_count,
                ),
                session_ttl_minutes: env_parse(
                    "QUIZ_SESSION_TTL_MINUTES",
                    quiz_defaults.session_ttl_minutes,
                ),
                max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", quiz_defaults.max_upload_bytes),
            },
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();
        let api_key = self.generation.api_key.expose_secret();

        if jwt_secret == DEV_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if api_key == DEV_GEMINI_API_KEY || api_key.is_empty() {
            panic!(
                "FATAL: GEMINI_API_KEY is not set! Set GEMINI_API_KEY environment variable."
            );
        }

        if self.quiz.chunk_overlap >= self.quiz.chunk_size {
            panic!(
                "FATAL: CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({}).",
                self.quiz.chunk_overlap, self.quiz.chunk_size
            );
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "docquiz-test".to_string(),
            quiz_results_collection: "quiz_results".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 5000,
            cors_allowed_origin: "http://localhost:5173".to_string(),
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            generation: GenerationConfig {
                api_key: SecretString::from("test_api_key".to_string()),
                base_url: "http://127.0.0.1:9".to_string(),
                model: "gemini-test".to_string(),
            },
            quiz: QuizConfig::default(),
        }
    }
}
