pub mod health_handler;
pub mod quiz_handler;

use actix_web::web;

use crate::{auth::AuthMiddleware, errors::AppError};

pub use health_handler::{health_check, health_check_ready};
pub use quiz_handler::{discard_current_quiz, generate_mcq, quiz_history, submit_quiz};

/// Registers every route. Health probes are public; quiz routes require a
/// bearer token. Malformed JSON bodies are reported as `AppError` payloads.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    );

    cfg.service(health_check).service(health_check_ready).service(
        web::scope("")
            .wrap(AuthMiddleware)
            .service(generate_mcq)
            .service(submit_quiz)
            .service(quiz_history)
            .service(discard_current_quiz),
    );
}
