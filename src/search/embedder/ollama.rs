use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{finish_batch, Embedder};
use crate::error::{RagError, Result};

const PROVIDER: &str = "ollama";

pub struct OllamaEmbedder {
    endpoint: String,
    model: String,
    dimensions: usize,
    client: Client,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    truncate: bool,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl OllamaEmbedder {
    pub fn new(endpoint: &str, model: &str, dimensions: usize, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| backend_error(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions,
            client,
        })
    }

    fn request_error(&self, e: reqwest::Error) -> RagError {
        if e.is_connect() {
            backend_error(format!(
                "Cannot connect to Ollama at {}. Is Ollama running? Start it with: ollama serve",
                self.endpoint
            ))
        } else if e.is_timeout() {
            backend_error(format!("request to {} timed out", self.endpoint))
        } else {
            backend_error(format!("request failed: {}", e))
        }
    }
}

/// Map a failed reply. Only server errors are retryable.
fn status_error(status: StatusCode, body: &str, model: &str) -> RagError {
    if status == StatusCode::NOT_FOUND || body.contains("not found") {
        return RagError::Configuration(format!(
            "Embedding model '{}' not found. Pull it with: ollama pull {}",
            model, model
        ));
    }
    if status.is_client_error() {
        return RagError::Configuration(format!(
            "Ollama rejected the embedding request (HTTP {}): {}",
            status, body
        ));
    }
    backend_error(format!("HTTP {}: {}", status, body))
}

fn backend_error(message: String) -> RagError {
    RagError::EmbeddingBackend {
        provider: PROVIDER.to_string(),
        message,
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| backend_error("no embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(model = %self.model, batch = texts.len(), "requesting embeddings");

        let request = EmbedRequest {
            model: &self.model,
            input: texts,
            truncate: true,
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body, &self.model));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| backend_error(format!("malformed response: {}", e)))?;

        finish_batch(PROVIDER, texts.len(), self.dimensions, embed_response.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.endpoint))
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body, &self.model));
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| backend_error(format!("malformed tags response: {}", e)))?;
        let model_available = tags
            .models
            .iter()
            .any(|m| m.name.starts_with(&self.model) || m.name == format!("{}:latest", self.model));

        if !model_available {
            return Err(RagError::Configuration(format!(
                "Model '{}' not installed. Pull it with: ollama pull {}",
                self.model, self.model
            )));
        }

        Ok(())
    }
}
