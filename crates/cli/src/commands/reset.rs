use super::open_store;
use crate::config::Config;
use anyhow::Result;
use std::io::Write;

pub async fn reset(config: &Config, yes: bool) -> Result<()> {
    if !yes && !confirm(&config.collection)? {
        println!("Aborted.");
        return Ok(());
    }

    let store = open_store(config)?;
    store.drop_collection().await?;
    println!("Collection '{}' dropped.", config.collection);
    Ok(())
}

fn confirm(collection: &str) -> Result<bool> {
    print!("Drop collection '{collection}' and all indexed data? [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
