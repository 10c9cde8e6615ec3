use super::open_store;
use crate::config::Config;
use anyhow::Result;

pub async fn stats(config: &Config) -> Result<()> {
    let store = open_store(config)?;

    let total = store.count().await?;
    println!("Collection: {}", config.collection);
    println!("Records:    {total}");

    let mut sources: Vec<String> = store.recorded_sources().await?.into_iter().collect();
    sources.sort();
    if sources.is_empty() {
        return Ok(());
    }

    println!("Sources:");
    for source in sources {
        let chunks = store.identities_for_source(&source).await?.len();
        println!("  {source}: {chunks}");
    }
    Ok(())
}
