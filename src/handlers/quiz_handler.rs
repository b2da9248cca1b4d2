use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::{AppError, AppResult},
    models::dto::{
        request::SubmitQuizRequest,
        response::{DiscardQuizResponse, SubmitQuizResponse},
    },
};

const UPLOAD_FIELD: &str = "file";

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// Reads the `file` field of a multipart form, refusing payloads above
/// `max_bytes`. Other fields are drained and ignored.
async fn read_upload(mut payload: Multipart, max_bytes: usize) -> AppResult<Upload> {
    let mut upload: Option<Upload> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::ValidationError(format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) || upload.is_some() {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| {
                    AppError::ValidationError(format!("Failed to read form field: {}", e))
                })?;
            }
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| AppError::ValidationError(format!("Failed to read file: {}", e)))?;
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::ValidationError(format!(
                    "File exceeds the {} byte upload limit",
                    max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        upload = Some(Upload { filename, bytes });
    }

    let upload =
        upload.ok_or_else(|| AppError::ValidationError("No file part in request".to_string()))?;
    if upload.filename.trim().is_empty() {
        return Err(AppError::ValidationError("No selected file".to_string()));
    }
    Ok(upload)
}

#[post("/generate_mcq")]
pub async fn generate_mcq(
    state: web::Data<AppState>,
    payload: Multipart,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let upload = read_upload(payload, state.config.quiz.max_upload_bytes).await?;

    let questions = state
        .quiz_service
        .generate_quiz(auth.actor(), &upload.filename, upload.bytes)
        .await?;
    Ok(HttpResponse::Ok().json(questions))
}

#[post("/submit_quiz")]
pub async fn submit_quiz(
    state: web::Data<AppState>,
    request: web::Json<SubmitQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let report = state
        .quiz_service
        .submit_quiz(auth.actor(), &request.answers)
        .await?;
    Ok(HttpResponse::Ok().json(SubmitQuizResponse::from(report)))
}

#[get("/quiz_history")]
pub async fn quiz_history(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let history = state.quiz_service.quiz_history(auth.actor()).await?;
    Ok(HttpResponse::Ok().json(history))
}

#[delete("/current_quiz")]
pub async fn discard_current_quiz(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let discarded = state.quiz_service.discard_quiz(auth.actor()).await;
    Ok(HttpResponse::Ok().json(DiscardQuizResponse { discarded }))
}
