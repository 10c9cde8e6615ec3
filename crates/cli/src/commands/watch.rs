use super::{open_provider, open_store, resolve_paths};
use crate::config::Config;
use anyhow::Result;
use memsearch_indexer::{start_watcher, Indexer, WatchObserver, WatcherConfig};
use std::path::PathBuf;
use std::sync::Arc;

pub async fn watch(config: &Config, paths: Vec<PathBuf>) -> Result<()> {
    let paths = resolve_paths(config, paths)?;
    let provider = open_provider(config)?;
    let store = open_store(config)?;
    let indexer = Arc::new(Indexer::new(provider, store));

    // Bring the collection up to date before listening for changes.
    let stats = indexer.index(&paths, false).await?;
    println!(
        "Initial index: {} files, {} chunks stored",
        stats.files, stats.stored
    );

    let observer: WatchObserver = Arc::new(|kind, summary, path| {
        println!("[{}] {}: {summary}", kind.as_str(), path.display());
    });
    let handle = start_watcher(
        indexer,
        paths.clone(),
        WatcherConfig {
            debounce: config.debounce,
        },
        Some(observer),
    )?;

    println!(
        "Watching {} path(s), debounce {}ms. Press Ctrl-C to stop.",
        paths.len(),
        config.debounce.as_millis()
    );
    tokio::signal::ctrl_c().await?;
    handle.stop().await;
    println!("Stopped.");
    Ok(())
}
