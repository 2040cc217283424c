mod args;
mod chat;
mod index;
mod init;
mod search;
pub mod tui;

pub use args::{Args, Command};
pub use chat::{run_ask, run_chat};
pub use index::{run_index, run_index_clear, run_index_status};
pub use init::run_init;
pub use search::run_search;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::retry::RetryPolicy;
use crate::search::{create_embedder, Embedder, FlatStore};

/// Embedder and (not yet loaded) store for the configured index location.
pub(crate) fn open_pipeline(config: &Config) -> Result<(Arc<dyn Embedder>, Arc<FlatStore>)> {
    let embedder = create_embedder(&config.embedder, config.request_timeout)?;
    let store = Arc::new(FlatStore::new(config.index_path()));
    Ok((embedder, store))
}

pub(crate) fn retry_policy(config: &Config) -> RetryPolicy {
    RetryPolicy::new(config.max_retries)
}
