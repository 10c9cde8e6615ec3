mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{Config, Overrides};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "memsearch",
    version,
    about = "Incremental semantic search over markdown directories"
)]
struct Cli {
    /// Config file (defaults to ./.memsearch.toml, then ~/.memsearch.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index markdown files into the vector collection
    Index {
        /// Directories or files to index (defaults to configured paths)
        paths: Vec<PathBuf>,

        /// Re-embed every chunk even when identities are unchanged
        #[arg(long)]
        force: bool,

        /// Embedding provider: openai, google, ollama, voyage
        #[arg(long)]
        provider: Option<String>,

        /// Embedding model (defaults to the provider's standard model)
        #[arg(long)]
        model: Option<String>,

        /// Milvus collection name
        #[arg(long)]
        collection: Option<String>,

        /// Milvus endpoint, e.g. http://localhost:19530
        #[arg(long)]
        milvus_uri: Option<String>,
    },

    /// Query the index with hybrid dense + lexical search
    Search {
        query: String,

        /// Maximum number of results
        #[arg(long, default_value_t = 5)]
        top_k: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Watch directories and re-index files as they change
    Watch {
        /// Directories to watch (defaults to configured paths)
        paths: Vec<PathBuf>,

        /// Debounce window in milliseconds
        #[arg(long)]
        debounce: Option<u64>,
    },

    /// Inspect or edit the .memsearch.toml config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show record counts for the collection
    Stats,

    /// Drop the collection and all indexed data
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starter config file with the defaults
    Init,

    /// Print one value by dotted key, e.g. provider.name
    Get { key: String },

    /// Set one value by dotted key, e.g. milvus.uri
    Set { key: String, value: String },

    /// Print the config file as stored
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Index {
            paths,
            force,
            provider,
            model,
            collection,
            milvus_uri,
        } => {
            let config = Config::resolve(
                config_path,
                Overrides {
                    provider,
                    model,
                    collection,
                    milvus_uri,
                    ..Overrides::default()
                },
            )?;
            commands::index(&config, paths, force).await
        }
        Command::Search { query, top_k, json } => {
            let config = Config::resolve(config_path, Overrides::default())?;
            commands::search(&config, &query, top_k, json).await
        }
        Command::Watch { paths, debounce } => {
            let config = Config::resolve(
                config_path,
                Overrides {
                    debounce_ms: debounce,
                    ..Overrides::default()
                },
            )?;
            commands::watch(&config, paths).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => commands::config_init(config_path),
            ConfigAction::Get { key } => commands::config_get(config_path, &key),
            ConfigAction::Set { key, value } => commands::config_set(config_path, &key, &value),
            ConfigAction::List => commands::config_list(config_path),
        },
        Command::Stats => {
            let config = Config::resolve(config_path, Overrides::default())?;
            commands::stats(&config).await
        }
        Command::Reset { yes } => {
            let config = Config::resolve(config_path, Overrides::default())?;
            commands::reset(&config, yes).await
        }
    }
}
