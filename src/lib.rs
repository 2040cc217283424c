//! Retrieval-augmented question answering over a local folder of documents.
//!
//! Documents are loaded ([`loader`]), split into overlapping chunks, embedded
//! and stored in a flat vector index ([`search`]). Questions are answered by
//! retrieving the closest chunks and prompting a chat model with them
//! ([`answer`]).

pub mod answer;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod retry;
pub mod search;

pub use config::Config;
pub use error::{RagError, Result};
