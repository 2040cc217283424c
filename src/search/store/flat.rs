use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use super::{cosine_similarity, IndexEntry, IndexStats, SearchResult, VectorStore};
use crate::error::{RagError, Result};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexData {
    version: u32,
    dimensions: Option<usize>,
    entries: Vec<IndexEntry>,
}

impl IndexData {
    fn empty() -> Self {
        Self {
            version: FORMAT_VERSION,
            ..Self::default()
        }
    }

    fn check_dimensions(&self, actual: usize) -> Result<()> {
        match self.dimensions {
            Some(expected) if expected != actual => {
                Err(RagError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }

    /// Problems that make a persisted index unusable.
    fn validate(&self) -> std::result::Result<(), String> {
        if self.version != FORMAT_VERSION {
            return Err(format!("unsupported index format version {}", self.version));
        }
        match self.dimensions {
            None if !self.entries.is_empty() => {
                Err("entries present but index dimension is missing".to_string())
            }
            Some(dims) => match self.entries.iter().find(|e| e.vector.len() != dims) {
                Some(bad) => Err(format!(
                    "entry {} has {}-d vector, index is {}-d",
                    bad.id,
                    bad.vector.len(),
                    dims
                )),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }
}

/// Brute-force vector index persisted as a single JSON file.
pub struct FlatStore {
    path: PathBuf,
    data: RwLock<IndexData>,
}

impl FlatStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(IndexData::empty()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, IndexData>> {
        self.data
            .read()
            .map_err(|e| RagError::Store(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, IndexData>> {
        self.data
            .write()
            .map_err(|e| RagError::Store(e.to_string()))
    }

    fn atomic_write(&self, data: &IndexData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let json = serde_json::to_vec(data)?;
        fs::write(&temp_path, json)?;
        fs::rename(temp_path, &self.path)?;

        Ok(())
    }

    fn not_found(&self, reason: impl Into<String>) -> RagError {
        RagError::StoreNotFound {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl VectorStore for FlatStore {
    async fn insert(&self, entries: Vec<IndexEntry>) -> Result<()> {
        let mut data = self.write()?;

        // Validate the whole batch before touching the index.
        let mut dims = data.dimensions;
        for entry in &entries {
            if entry.vector.is_empty() {
                return Err(RagError::InvalidArgument(format!(
                    "entry {} has an empty vector",
                    entry.id
                )));
            }
            match dims {
                Some(expected) if expected != entry.vector.len() => {
                    return Err(RagError::DimensionMismatch {
                        expected,
                        actual: entry.vector.len(),
                    });
                }
                Some(_) => {}
                None => dims = Some(entry.vector.len()),
            }
        }

        data.dimensions = dims;
        data.entries.extend(entries);
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let data = self.read()?;
        if data.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        data.check_dimensions(vector.len())?;

        let mut scored: Vec<(usize, f32)> = data
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(vector, &entry.vector)))
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchResult::new(data.entries[i].clone(), score))
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.read()?.entries.len())
    }

    async fn persist(&self) -> Result<()> {
        let data = self.read()?;
        self.atomic_write(&data)?;
        info!(path = %self.path.display(), entries = data.entries.len(), "persisted index");
        Ok(())
    }

    async fn load(&self) -> Result<()> {
        if !self.path.is_file() {
            return Err(self.not_found("index file does not exist; run ingestion first"));
        }

        let content = fs::read(&self.path).map_err(|e| self.not_found(e.to_string()))?;
        let loaded: IndexData = serde_json::from_slice(&content)
            .map_err(|e| self.not_found(format!("corrupted index: {}", e)))?;
        loaded
            .validate()
            .map_err(|reason| self.not_found(format!("corrupted index: {}", reason)))?;

        debug!(path = %self.path.display(), entries = loaded.entries.len(), "loaded index");

        let mut data = self.write()?;
        *data = loaded;

        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats> {
        let data = self.read()?;

        let index_size = if self.path.is_file() {
            fs::metadata(&self.path)?.len()
        } else {
            0
        };

        let sources: HashSet<&str> = data
            .entries
            .iter()
            .map(|e| e.metadata.source.as_str())
            .collect();
        let hashes: HashSet<&str> = data
            .entries
            .iter()
            .map(|e| e.content_hash.as_str())
            .collect();
        let last_updated = data.entries.iter().map(|e| e.created_at).max();

        Ok(IndexStats {
            total_entries: data.entries.len(),
            total_sources: sources.len(),
            duplicate_entries: data.entries.len() - hashes.len(),
            dimensions: data.dimensions,
            index_size_bytes: index_size,
            last_updated,
        })
    }

    async fn clear(&self) -> Result<()> {
        let mut data = self.write()?;
        *data = IndexData::empty();

        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::chunker::Chunk;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn entry(text: &str, source: &str, vector: Vec<f32>) -> IndexEntry {
        IndexEntry::from_chunk(
            Chunk {
                text: text.to_string(),
                source: source.to_string(),
                page: None,
                start_index: 0,
                chunk_index: 0,
            },
            vector,
        )
    }

    fn store_in(dir: &TempDir) -> FlatStore {
        FlatStore::new(dir.path().join("index").join("index.json"))
    }

    #[tokio::test]
    async fn test_query_orders_by_similarity() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .insert(vec![
                entry("x", "a.txt", vec![1.0, 0.0]),
                entry("y", "a.txt", vec![0.0, 1.0]),
                entry("xy", "b.txt", vec![0.7071, 0.7071]),
            ])
            .await
            .unwrap();

        let results = store.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entry.text, "x");
        assert_eq!(results[1].entry.text, "xy");
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .insert(vec![
                entry("first", "a.txt", vec![0.0, 1.0]),
                entry("second", "a.txt", vec![0.0, 1.0]),
                entry("third", "a.txt", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = store.query(&[0.0, 1.0], 3).await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.entry.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_top_k_from_large_index() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let entries: Vec<IndexEntry> = (0..200)
            .map(|i| {
                let vector = if i == 40 || i == 150 {
                    vec![1.0, 0.0]
                } else if i == 90 {
                    vec![0.9, 0.1]
                } else {
                    vec![0.0, 1.0]
                };
                entry(&format!("e{}", i), "big.txt", vector)
            })
            .collect();
        store.insert(entries).await.unwrap();

        let results = store.query(&[1.0, 0.0], 3).await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.entry.text.as_str()).collect();
        assert_eq!(texts, vec!["e40", "e150", "e90"]);
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert!((results[1].score - 1.0).abs() < 1e-6);
        assert!(results[2].score < results[1].score);
        assert_eq!(results[2].entry.vector, vec![0.9, 0.1]);
    }

    #[tokio::test]
    async fn test_k_larger_than_count_returns_everything() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.insert(vec![entry("only", "a.txt", vec![1.0])]).await.unwrap();

        assert_eq!(store.query(&[1.0], 10).await.unwrap().len(), 1);
        assert!(store.query(&[1.0], 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_rejects_mixed_dimensions() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.insert(vec![entry("a", "a.txt", vec![1.0, 0.0])]).await.unwrap();

        let err = store
            .insert(vec![entry("b", "a.txt", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 3 }));
        assert_eq!(store.count().await.unwrap(), 1);

        let err = store.query(&[1.0], 1).await.unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_insert_appends_duplicates() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        for _ in 0..2 {
            store.insert(vec![entry("same", "a.txt", vec![1.0])]).await.unwrap();
        }

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.duplicate_entries, 1);
        assert_eq!(stats.total_sources, 1);
    }

    #[tokio::test]
    async fn test_persist_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let target = vec![0.6, 0.8, 0.0];
        store
            .insert(vec![
                entry("other", "a.txt", vec![0.0, 0.0, 1.0]),
                entry("target", "b.txt", target.clone()),
            ])
            .await
            .unwrap();
        store.persist().await.unwrap();

        let reopened = store_in(&dir);
        reopened.load().await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 2);

        let results = reopened.query(&target, 1).await.unwrap();
        assert_eq!(results[0].entry.text, "target");
        assert_eq!(results[0].entry.metadata.source, "b.txt");
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_load_missing_index_fails() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, RagError::StoreNotFound { .. }));
    }

    #[tokio::test]
    async fn test_load_corrupted_index_fails_and_keeps_memory() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.insert(vec![entry("kept", "a.txt", vec![1.0])]).await.unwrap();

        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), b"{ not json").unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, RagError::StoreNotFound { .. }));
        assert!(err.to_string().contains("corrupted"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_rejects_inconsistent_dimensions() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let bad = IndexData {
            version: FORMAT_VERSION,
            dimensions: Some(2),
            entries: vec![entry("bad", "a.txt", vec![1.0, 0.0, 0.0])],
        };
        store.atomic_write(&bad).unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, RagError::StoreNotFound { .. }));
    }

    #[tokio::test]
    async fn test_clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.insert(vec![entry("a", "a.txt", vec![1.0])]).await.unwrap();
        store.persist().await.unwrap();
        assert!(store.exists());

        store.clear().await.unwrap();
        assert!(!store.exists());
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.stats().await.unwrap().dimensions, None);
    }

    fn arb_unit_vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
        proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero", |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-6 {
                return None;
            }
            for x in &mut v {
                *x /= norm;
            }
            Some(v)
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_query_length_and_ordering(
            vectors in proptest::collection::vec(arb_unit_vector(8), 1..30),
            query in arb_unit_vector(8),
            k in 1usize..40,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let store = FlatStore::new(PathBuf::from("unused.json"));
                let entries = vectors
                    .iter()
                    .enumerate()
                    .map(|(i, v)| entry(&i.to_string(), "p.txt", v.clone()))
                    .collect();
                store.insert(entries).await.unwrap();
                store.query(&query, k).await.unwrap()
            });

            prop_assert_eq!(results.len(), k.min(vectors.len()));
            for pair in results.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
