use std::sync::Arc;
use tracing::debug;

use crate::error::{RagError, Result};
use crate::retry::RetryPolicy;

use super::embedder::Embedder;
use super::store::{SearchResult, VectorStore};

pub struct Searcher {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    retry: RetryPolicy,
}

impl Searcher {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Embed the query and return the `min(k, count)` closest entries.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be at least 1".to_string()));
        }
        if query.trim().is_empty() {
            return Err(RagError::InvalidArgument("query must not be empty".to_string()));
        }

        // The store is not locked while the embedder is called.
        let query_vector = self
            .retry
            .run("embed_query", || self.embedder.embed(query))
            .await
            .map_err(|e| RagError::Query {
                query: query.to_string(),
                source: Box::new(e),
            })?;

        let results = self.store.query(&query_vector, k).await?;
        debug!(query, k, results = results.len(), "retrieved");

        Ok(results)
    }
}
