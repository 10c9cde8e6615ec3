mod config;
mod index;
mod reset;
mod search;
mod stats;
mod watch;

pub use config::{config_get, config_init, config_list, config_set};
pub use index::index;
pub use reset::reset;
pub use search::search;
pub use stats::stats;
pub use watch::watch;

use crate::config::Config;
use anyhow::Result;
use memsearch_embeddings::{create_provider, EmbeddingProvider};
use memsearch_store::{MilvusConfig, MilvusStore, VectorStore};
use std::path::PathBuf;
use std::sync::Arc;

fn open_store(config: &Config) -> Result<Arc<dyn VectorStore>> {
    let mut milvus = MilvusConfig::new(&config.milvus_uri, &config.collection);
    if let Some(token) = &config.milvus_token {
        milvus = milvus.with_token(token);
    }
    Ok(Arc::new(MilvusStore::new(milvus)?))
}

fn open_provider(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    Ok(create_provider(
        config.provider_kind,
        config.provider_options.clone(),
    )?)
}

/// Paths given on the command line win; otherwise fall back to the
/// configured ones.
fn resolve_paths(config: &Config, cli_paths: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let paths = if cli_paths.is_empty() {
        config.paths.clone()
    } else {
        cli_paths
    };
    if paths.is_empty() {
        anyhow::bail!(
            "no paths to index; pass them as arguments or set `paths` in .memsearch.toml"
        );
    }
    Ok(paths)
}
