pub mod chunker;
pub mod embedder;
pub mod indexer;
pub mod searcher;
pub mod store;

pub use chunker::{Chunk, Chunker};
pub use embedder::{create_embedder, Embedder, HashingEmbedder, OllamaEmbedder};
pub use indexer::{IngestReport, IngestWarning, Indexer};
pub use searcher::Searcher;
pub use store::{FlatStore, IndexEntry, IndexStats, SearchResult, VectorStore};
