use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("No readable text found in file: {0}")]
    UnreadableDocument(String),

    #[error("Generation failed{}: {message}", status_suffix(.status))]
    GenerationFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid quiz response: {0}")]
    ParseError(String),

    #[error("No active quiz session")]
    NoActiveQuiz,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn generation(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::GenerationFailed {
            status,
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::UnreadableDocument(_) => "UNREADABLE_DOCUMENT",
            AppError::GenerationFailed { .. } => "GENERATION_FAILED",
            AppError::ParseError(_) => "PARSE_ERROR",
            AppError::NoActiveQuiz => "NO_ACTIVE_QUIZ",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnreadableDocument(_) => StatusCode::BAD_REQUEST,
            AppError::GenerationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ParseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NoActiveQuiz => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("[{}] {}", self.error_code(), self);
        } else {
            log::warn!("[{}] {}", self.error_code(), self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::generation(err.status().map(|s| s.as_u16()), err.to_string())
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

pub type AppResult<T> = Result<T, AppError>;
