mod flat;
mod types;

pub use flat::FlatStore;
pub use types::{hash_content, EntryMetadata, IndexEntry, IndexStats, SearchResult};

use async_trait::async_trait;

use crate::error::Result;

/// Storage for index entries with nearest-neighbour lookup.
///
/// Callers hold an `Arc<dyn VectorStore>`, so an approximate index can
/// replace the brute-force [`FlatStore`] without touching them.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append entries. No deduplication.
    async fn insert(&self, entries: Vec<IndexEntry>) -> Result<()>;
    /// The `min(k, count)` most similar entries, best first, ties in insertion order.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<SearchResult>>;
    async fn count(&self) -> Result<usize>;
    async fn persist(&self) -> Result<()>;
    /// Replace in-memory contents with the persisted index.
    async fn load(&self) -> Result<()>;
    async fn stats(&self) -> Result<IndexStats>;
    async fn clear(&self) -> Result<()>;
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
