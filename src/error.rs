//! Error types for the `docrag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or querying the document index.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid or missing configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The data folder holds no file with a supported extension.
    #[error("No supported documents found in {} (supported: .txt, .pdf, .docx)", folder.display())]
    NoDocumentsFound {
        /// The folder that was scanned.
        folder: PathBuf,
    },

    /// The embedding backend failed or returned malformed output.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingBackend {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// No usable index exists at the configured location.
    #[error("No index found at {}: {reason}", path.display())]
    StoreNotFound {
        /// The index file that was looked up.
        path: PathBuf,
        /// Why the index could not be used (missing, corrupted, ...).
        reason: String,
    },

    /// A vector did not match the dimensionality of the index.
    #[error("Vector dimension mismatch: index holds {expected}-d vectors, got {actual}")]
    DimensionMismatch {
        /// Dimension already fixed by the index.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },

    /// A supported file could not be read or decoded.
    #[error("Failed to load {}: {message}", path.display())]
    Load {
        /// The file that failed to load.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// The answer generator failed or returned nothing usable.
    #[error("Generation error ({model}): {message}")]
    Generation {
        /// The chat model that was called.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// A caller passed an argument outside the accepted range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal vector store failure (e.g. a poisoned lock).
    #[error("Vector store error: {0}")]
    Store(String),

    /// Ingestion of a single file failed.
    #[error("Ingestion failed for '{file}': {source}")]
    Ingest {
        /// Source file name.
        file: String,
        /// The underlying failure.
        #[source]
        source: Box<RagError>,
    },

    /// Retrieval for a query failed.
    #[error("Retrieval failed for query '{query}': {source}")]
    Query {
        /// The query text.
        query: String,
        /// The underlying failure.
        #[source]
        source: Box<RagError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RagError {
    /// Whether the failure came from an external service and may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RagError::EmbeddingBackend { .. } | RagError::Generation { .. })
    }
}

/// A convenience result type for docrag operations.
pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let backend = RagError::EmbeddingBackend {
            provider: "ollama".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(backend.is_retryable());
        assert!(!RagError::Configuration("x".to_string()).is_retryable());
        assert!(!RagError::NoDocumentsFound { folder: PathBuf::from("data") }.is_retryable());
    }

    #[test]
    fn test_context_wrappers_name_the_file() {
        let err = RagError::Ingest {
            file: "notes.txt".to_string(),
            source: Box::new(RagError::EmbeddingBackend {
                provider: "ollama".to_string(),
                message: "timed out".to_string(),
            }),
        };
        let message = err.to_string();
        assert!(message.contains("notes.txt"));
        assert!(message.contains("timed out"));
    }
}
