mod hashing;
mod ollama;

pub use hashing::HashingEmbedder;
pub use ollama::OllamaEmbedder;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::EmbedderConfig;
use crate::error::{RagError, Result};

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    /// One L2-normalized vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
    fn dimensions(&self) -> usize;
    fn model_name(&self) -> &str;
    async fn health_check(&self) -> Result<()>;
}

/// Build the configured embedding backend.
pub fn create_embedder(config: &EmbedderConfig, timeout: Duration) -> Result<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            &config.endpoint,
            &config.model,
            config.dimensions,
            timeout,
        )?)),
        "hashing" => Ok(Arc::new(HashingEmbedder::new(config.dimensions))),
        other => Err(RagError::Configuration(format!(
            "unknown EMBEDDING_PROVIDER '{}' (expected 'ollama' or 'hashing')",
            other
        ))),
    }
}

/// Scale a vector to unit length in place. Zero vectors are left unchanged.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Check a backend response against the request and normalize it.
pub(crate) fn finish_batch(
    provider: &str,
    expected_len: usize,
    dimensions: usize,
    mut vectors: Vec<Vec<f32>>,
) -> Result<Vec<Vec<f32>>> {
    if vectors.len() != expected_len {
        return Err(RagError::EmbeddingBackend {
            provider: provider.to_string(),
            message: format!(
                "expected {} embeddings, backend returned {}",
                expected_len,
                vectors.len()
            ),
        });
    }

    for vector in vectors.iter_mut() {
        if vector.len() != dimensions {
            return Err(RagError::EmbeddingBackend {
                provider: provider.to_string(),
                message: format!(
                    "expected {}-d embeddings, backend returned {}-d (check EMBEDDING_DIMENSIONS)",
                    dimensions,
                    vector.len()
                ),
            });
        }
        l2_normalize(vector);
    }

    Ok(vectors)
}
