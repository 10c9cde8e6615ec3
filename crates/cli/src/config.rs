use anyhow::{bail, Context, Result};
use memsearch_embeddings::{ProviderKind, ProviderOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = ".memsearch.toml";

const DEFAULT_PROVIDER: &str = "openai";
const DEFAULT_MILVUS_URI: &str = "http://localhost:19530";
const DEFAULT_COLLECTION: &str = "memsearch_chunks";
const DEFAULT_DEBOUNCE_MS: u64 = 1500;

/// Raw `.memsearch.toml` contents. Everything is optional; resolution fills
/// in the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub paths: Option<Vec<String>>,
    pub debounce_ms: Option<u64>,
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub milvus: MilvusSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSection {
    pub name: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub dimension: Option<usize>,
    pub batch_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MilvusSection {
    pub uri: Option<String>,
    pub token: Option<String>,
    pub collection: Option<String>,
}

/// Command-line flag overrides; a set flag always beats the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub collection: Option<String>,
    pub milvus_uri: Option<String>,
    pub debounce_ms: Option<u64>,
}

/// Fully resolved, validated configuration. Built once in `main`; commands
/// receive plain values and never re-derive defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub paths: Vec<PathBuf>,
    pub debounce: Duration,
    pub provider_kind: ProviderKind,
    pub provider_options: ProviderOptions,
    pub milvus_uri: String,
    pub milvus_token: Option<String>,
    pub collection: String,
}

impl Config {
    pub fn resolve(explicit_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let file = load_file_config(explicit_path)?;
        Self::from_parts(file, overrides)
    }

    fn from_parts(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let provider_name = overrides
            .provider
            .or(file.provider.name)
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
        let provider_kind: ProviderKind = provider_name
            .parse()
            .with_context(|| format!("invalid provider '{provider_name}'"))?;

        let provider_options = ProviderOptions {
            model: overrides.model.or(file.provider.model),
            batch_size: file.provider.batch_size,
            api_key: file.provider.api_key,
            base_url: file.provider.base_url,
            dimension: file.provider.dimension,
        };

        let collection = overrides
            .collection
            .or(file.milvus.collection)
            .unwrap_or_else(|| DEFAULT_COLLECTION.to_string());
        if collection.is_empty() {
            bail!("milvus.collection must not be empty");
        }

        let milvus_uri = expand_tilde_str(
            &overrides
                .milvus_uri
                .or(file.milvus.uri)
                .unwrap_or_else(|| DEFAULT_MILVUS_URI.to_string()),
        );
        let milvus_token = file.milvus.token.filter(|token| !token.is_empty());

        let paths = file
            .paths
            .unwrap_or_default()
            .iter()
            .map(|p| expand_tilde(p))
            .collect();

        let debounce_ms = overrides
            .debounce_ms
            .or(file.debounce_ms)
            .unwrap_or(DEFAULT_DEBOUNCE_MS);

        Ok(Self {
            paths,
            debounce: Duration::from_millis(debounce_ms),
            provider_kind,
            provider_options,
            milvus_uri,
            milvus_token,
            collection,
        })
    }
}

/// Explicit path must exist; otherwise try the working directory, then the
/// home directory, then fall back to pure defaults.
fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = match explicit_path {
        Some(path) => {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            Some(path.to_path_buf())
        }
        None => [
            Some(PathBuf::from(CONFIG_FILE_NAME)),
            dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME)),
        ]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.exists()),
    };

    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    log::debug!("Loading config from {}", path.display());
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

#[must_use]
pub fn expand_tilde(raw: &str) -> PathBuf {
    PathBuf::from(expand_tilde_str(raw))
}

fn expand_tilde_str(raw: &str) -> String {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home.to_string_lossy().to_string();
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    raw.to_string()
}
