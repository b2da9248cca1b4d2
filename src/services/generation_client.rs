use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    config::GenerationConfig,
    errors::{AppError, AppResult},
};

/// Sends a prompt to an external text-generation service and returns the
/// generated text. One attempt per call; callers own any timeout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    pub fn into_text(self) -> AppResult<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| {
                AppError::generation(None, "response envelope has no candidate text")
            })
    }
}

/// `generateContent` client for the Gemini API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: SecretString,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        log::info!("Requesting generation ({} prompt chars)", prompt.len());

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::generation(
                Some(status.as_u16()),
                format!("generation endpoint returned {}: {}", status, body),
            ));
        }

        let envelope: GenerateContentResponse = response.json().await.map_err(|e| {
            AppError::generation(None, format!("malformed response envelope: {}", e))
        })?;

        envelope.into_text()
    }
}
