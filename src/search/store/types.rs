use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::search::chunker::Chunk;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Source file name.
    pub source: String,
    /// 1-based page, for chunks of paginated documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    pub start_index: usize,
    pub chunk_index: usize,
}

impl EntryMetadata {
    /// Source file name, with the page when there is one.
    pub fn label(&self) -> String {
        match self.page {
            Some(page) => format!("{}, page {}", self.source, page),
            None => self.source.clone(),
        }
    }
}

/// A durable (chunk text, vector, metadata) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
    pub metadata: EntryMetadata,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

impl IndexEntry {
    pub fn from_chunk(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content_hash: hash_content(&chunk.text),
            metadata: EntryMetadata {
                source: chunk.source,
                page: chunk.page,
                start_index: chunk.start_index,
                chunk_index: chunk.chunk_index,
            },
            text: chunk.text,
            vector,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub entry: IndexEntry,
    pub score: f32,
}

impl SearchResult {
    pub fn new(entry: IndexEntry, score: f32) -> Self {
        Self { entry, score }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_entries: usize,
    pub total_sources: usize,
    /// Entries whose text already appears earlier in the index.
    pub duplicate_entries: usize,
    pub dimensions: Option<usize>,
    pub index_size_bytes: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}
