use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::AnswerGenerator;
use crate::error::{RagError, Result};

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const TEMPERATURE: f32 = 0.1;

/// Chat model behind Google's `generateContent` REST endpoint.
pub struct GeminiGenerator {
    endpoint: String,
    model: String,
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiGenerator {
    pub fn new(model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        Self::with_endpoint(DEFAULT_GEMINI_ENDPOINT, model, api_key, timeout)
    }

    pub fn with_endpoint(
        endpoint: &str,
        model: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RagError::Configuration(
                "GOOGLE_API_KEY is required to generate answers".to_string(),
            ));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            RagError::Generation {
                model: model.to_string(),
                message: format!("failed to create HTTP client: {}", e),
            }
        })?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn error(&self, message: String) -> RagError {
        RagError::Generation {
            model: self.model.clone(),
            message,
        }
    }

    fn request_error(&self, e: reqwest::Error) -> RagError {
        if e.is_timeout() {
            self.error("request timed out".to_string())
        } else if e.is_connect() {
            self.error(format!("cannot connect to {}", self.endpoint))
        } else {
            // reqwest includes the URL in its message, which carries the key.
            self.error(format!("request failed: {}", e.without_url()))
        }
    }
}

/// Concatenate the text parts of the first candidate.
fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    let candidate = response.candidates.into_iter().next()?;
    let text: String = candidate
        .content?
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect();
    if text.trim().is_empty() {
        debug!(finish_reason = ?candidate.finish_reason, "candidate carried no text");
    }
    Some(text)
}

#[async_trait]
impl AnswerGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "requesting answer");

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.endpoint, self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RagError::Configuration(
                    format!("GOOGLE_API_KEY was rejected (HTTP {})", status),
                ),
                StatusCode::NOT_FOUND => {
                    RagError::Configuration(format!("chat model '{}' not found", self.model))
                }
                _ => self.error(format!("HTTP {}: {}", status, body)),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| self.error(format!("malformed response: {}", e.without_url())))?;

        first_candidate_text(parsed).ok_or_else(|| self.error("no candidates returned".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
