use super::{open_provider, open_store};
use crate::config::Config;
use anyhow::Result;
use memsearch_search::HybridSearch;

pub async fn search(config: &Config, query: &str, top_k: usize, json: bool) -> Result<()> {
    let provider = open_provider(config)?;
    let store = open_store(config)?;
    let results = HybridSearch::new(provider, store).search(query, top_k).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (rank, result) in results.iter().enumerate() {
        println!(
            "{}. {} ({}:{}-{}) score={:.4}",
            rank + 1,
            if result.heading.is_empty() {
                "(preamble)"
            } else {
                result.heading.as_str()
            },
            result.source,
            result.start_line,
            result.end_line,
            result.score
        );
        for line in result.content.lines() {
            println!("   {line}");
        }
        println!();
    }
    Ok(())
}
