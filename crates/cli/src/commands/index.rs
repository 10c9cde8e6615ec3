use super::{open_provider, open_store, resolve_paths};
use crate::config::Config;
use anyhow::Result;
use memsearch_indexer::Indexer;
use std::path::PathBuf;

pub async fn index(config: &Config, paths: Vec<PathBuf>, force: bool) -> Result<()> {
    let paths = resolve_paths(config, paths)?;
    let provider = open_provider(config)?;
    let store = open_store(config)?;
    let indexer = Indexer::new(provider, store);

    let stats = indexer.index(&paths, force).await?;

    println!(
        "Indexed {} files: {} chunks seen, {} stored, {} sources pruned ({}ms)",
        stats.files, stats.chunks, stats.stored, stats.pruned_sources, stats.time_ms
    );
    for error in &stats.errors {
        eprintln!("warning: {error}");
    }
    if stats.has_errors() {
        anyhow::bail!("{} file(s) failed to index", stats.errors.len());
    }
    Ok(())
}
