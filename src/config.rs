//! Process-wide configuration, read once from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RagError, Result};

pub const DEFAULT_DATA_FOLDER: &str = "./data/documents";
pub const DEFAULT_PERSIST_DIRECTORY: &str = "./storage/index";
pub const INDEX_FILE_NAME: &str = "index.json";

/// Chunking parameters, measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Which embedding backend to use and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedderConfig {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub dimensions: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "all-minilm".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            dimensions: 384,
        }
    }
}

/// Everything the pipeline needs, constructed once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_folder: PathBuf,
    pub persist_directory: PathBuf,
    pub chunking: ChunkingConfig,
    pub search_k: usize,
    pub embedder: EmbedderConfig,
    pub chat_model: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_folder: PathBuf::from(DEFAULT_DATA_FOLDER),
            persist_directory: PathBuf::from(DEFAULT_PERSIST_DIRECTORY),
            chunking: ChunkingConfig::default(),
            search_k: 4,
            embedder: EmbedderConfig::default(),
            chat_model: "gemini-1.5-flash".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(120),
            max_retries: 2,
        }
    }
}

impl Config {
    /// Read configuration from process environment variables.
    ///
    /// Call `dotenvy::dotenv()` beforehand to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, then validate it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let config = Config {
            data_folder: get("DATA_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_folder),
            persist_directory: get("PERSIST_DIRECTORY")
                .map(PathBuf::from)
                .unwrap_or(defaults.persist_directory),
            chunking: ChunkingConfig {
                chunk_size: parse_or("CHUNK_SIZE", get("CHUNK_SIZE"), defaults.chunking.chunk_size)?,
                chunk_overlap: parse_or(
                    "CHUNK_OVERLAP",
                    get("CHUNK_OVERLAP"),
                    defaults.chunking.chunk_overlap,
                )?,
            },
            search_k: parse_or("SEARCH_K", get("SEARCH_K"), defaults.search_k)?,
            embedder: EmbedderConfig {
                provider: get("EMBEDDING_PROVIDER")
                    .map(|p| p.to_lowercase())
                    .unwrap_or(defaults.embedder.provider),
                model: get("EMBEDDING_MODEL").unwrap_or(defaults.embedder.model),
                endpoint: get("EMBEDDING_ENDPOINT").unwrap_or(defaults.embedder.endpoint),
                dimensions: parse_or(
                    "EMBEDDING_DIMENSIONS",
                    get("EMBEDDING_DIMENSIONS"),
                    defaults.embedder.dimensions,
                )?,
            },
            chat_model: get("CHAT_MODEL").unwrap_or(defaults.chat_model),
            api_key: get("GOOGLE_API_KEY"),
            request_timeout: Duration::from_secs(parse_or(
                "REQUEST_TIMEOUT_SECS",
                get("REQUEST_TIMEOUT_SECS"),
                defaults.request_timeout.as_secs(),
            )?),
            max_retries: parse_or("MAX_RETRIES", get("MAX_RETRIES"), defaults.max_retries)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every command relies on.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(RagError::Configuration(
                "CHUNK_SIZE must be greater than zero".to_string(),
            ));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(RagError::Configuration(format!(
                "CHUNK_OVERLAP ({}) must be less than CHUNK_SIZE ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.search_k == 0 {
            return Err(RagError::Configuration(
                "SEARCH_K must be greater than zero".to_string(),
            ));
        }
        if self.embedder.dimensions == 0 {
            return Err(RagError::Configuration(
                "EMBEDDING_DIMENSIONS must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(RagError::Configuration(
                "REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The LLM credential; answering commands call this at startup.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            RagError::Configuration(
                "GOOGLE_API_KEY is missing. Set it in the environment or a .env file.".to_string(),
            )
        })
    }

    /// Location of the persisted index file.
    pub fn index_path(&self) -> PathBuf {
        self.persist_directory.join(INDEX_FILE_NAME)
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| {
            RagError::Configuration(format!("{} must be a non-negative integer, got '{}'", key, value))
        }),
    }
}
