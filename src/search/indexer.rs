use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{RagError, Result};
use crate::loader::{source_name, LoaderKind};
use crate::retry::RetryPolicy;

use super::chunker::{Chunk, Chunker};
use super::embedder::Embedder;
use super::store::{IndexEntry, VectorStore};

/// A per-file problem that was skipped rather than aborting ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestWarning {
    UnsupportedFormat { file: String, extension: String },
    LoadFailed { file: String, reason: String },
}

impl fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestWarning::UnsupportedFormat { file, extension } => write!(
                f,
                "Unsupported file format '{}': {} (supported: {})",
                extension,
                file,
                LoaderKind::SUPPORTED_EXTENSIONS.join(", ")
            ),
            IngestWarning::LoadFailed { file, reason } => {
                write!(f, "Could not load {}: {}", file, reason)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub entries_written: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub warnings: Vec<IngestWarning>,
}

pub struct Indexer {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    retry: RetryPolicy,
}

impl Indexer {
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

    /// Load, chunk, embed and insert every supported file in `folder`.
    ///
    /// Entries are appended to whatever the store already holds; the caller
    /// decides whether to clear first and when to persist.
    pub async fn ingest(
        &self,
        folder: &Path,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<IngestReport> {
        let chunker = Chunker::new(chunk_size, chunk_overlap)?;
        let files = list_files(folder)?;

        let mut report = IngestReport::default();
        let mut supported = 0usize;
        let mut total_chunk_chars = 0usize;

        for path in files {
            let file = source_name(&path);

            let Some(kind) = LoaderKind::for_path(&path) else {
                let extension = path
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default();
                warn!(file = %file, extension = %extension, "skipping unsupported file");
                report.files_skipped += 1;
                report
                    .warnings
                    .push(IngestWarning::UnsupportedFormat { file, extension });
                continue;
            };
            supported += 1;

            let documents = match kind.load(&path) {
                Ok(documents) => documents,
                Err(e) => {
                    warn!(file = %file, error = %e, "skipping file that failed to load");
                    report.files_skipped += 1;
                    report.warnings.push(IngestWarning::LoadFailed {
                        file,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            // One batch per file; PDF pages are chunked separately.
            let chunks: Vec<Chunk> = documents
                .iter()
                .flat_map(|document| chunker.chunk(document))
                .collect();
            total_chunk_chars += chunks.iter().map(|c| c.text.chars().count()).sum::<usize>();

            let written = self
                .index_chunks(chunks)
                .await
                .map_err(|e| RagError::Ingest {
                    file: file.clone(),
                    source: Box::new(e),
                })?;

            info!(file = %file, loader = %kind, entries = written, "ingested file");
            report.files_processed += 1;
            report.entries_written += written;
        }

        if supported == 0 {
            return Err(RagError::NoDocumentsFound {
                folder: folder.to_path_buf(),
            });
        }

        let average = if report.entries_written > 0 {
            total_chunk_chars as f64 / report.entries_written as f64
        } else {
            0.0
        };
        info!(
            files = report.files_processed,
            skipped = report.files_skipped,
            entries = report.entries_written,
            average_chunk_chars = (average * 100.0).round() / 100.0,
            "ingestion complete"
        );

        Ok(report)
    }

    /// Embed one file's chunks in a single batch and insert the entries.
    async fn index_chunks(&self, chunks: Vec<Chunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .retry
            .run("embed_batch", || self.embedder.embed_batch(&texts))
            .await?;

        if vectors.len() != chunks.len() {
            return Err(RagError::EmbeddingBackend {
                provider: self.embedder.model_name().to_string(),
                message: format!(
                    "expected {} embeddings, got {}",
                    chunks.len(),
                    vectors.len()
                ),
            });
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry::from_chunk(chunk, vector))
            .collect();
        let count = entries.len();

        self.store.insert(entries).await?;
        Ok(count)
    }
}

/// Regular files directly inside `folder`, sorted by name.
pub fn list_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(RagError::Configuration(format!(
            "data folder '{}' does not exist or is not a directory",
            folder.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| RagError::Io(std::io::Error::other(e)))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
