use crate::error::{EmbeddingError, Result};
use crate::{GoogleProvider, OllamaProvider, OpenAiProvider, VoyageProvider};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;

/// Batch embedding capability.
///
/// Implementations must preserve input order (vector `i` corresponds to text
/// `i`) and return an empty vector for empty input without touching the
/// network.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Model identifier as it participates in chunk identities.
    fn model_name(&self) -> &str;

    fn dimension(&self) -> usize;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Closed set of supported embedding vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Google,
    Ollama,
    Voyage,
}

impl ProviderKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Google => "google",
            Self::Ollama => "ollama",
            Self::Voyage => "voyage",
        }
    }

    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "text-embedding-3-small",
            Self::Google => "gemini-embedding-001",
            Self::Ollama => "nomic-embed-text",
            Self::Voyage => "voyage-3-lite",
        }
    }

    #[must_use]
    pub const fn default_batch_size(self) -> usize {
        match self {
            Self::OpenAi => 2048,
            Self::Google => 100,
            Self::Ollama => 512,
            Self::Voyage => 512,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "google" => Ok(Self::Google),
            "ollama" => Ok(Self::Ollama),
            "voyage" => Ok(Self::Voyage),
            other => Err(EmbeddingError::UnknownProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Factory options; unset fields fall back to per-provider defaults.
#[derive(Debug, Clone, Default)]
pub struct ProviderOptions {
    pub model: Option<String>,
    pub batch_size: Option<usize>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub dimension: Option<usize>,
}

/// Output dimensions for common models.
#[must_use]
pub fn known_dimension(model: &str) -> Option<usize> {
    let dim = match model {
        // OpenAI
        "text-embedding-3-small" | "text-embedding-ada-002" => 1536,
        "text-embedding-3-large" => 3072,
        // Google
        "gemini-embedding-001" | "text-embedding-004" => 768,
        // Voyage
        "voyage-3-lite" | "voyage-3" | "mxbai-embed-large" => 1024,
        "voyage-2" => 1536,
        // Ollama
        "nomic-embed-text" => 768,
        "all-minilm" => 384,
        _ => return None,
    };
    Some(dim)
}

/// Construct the provider for `kind`.
///
/// Fails fast on missing API keys so indexing never starts with a provider
/// that cannot embed.
pub fn create_provider(
    kind: ProviderKind,
    options: ProviderOptions,
) -> Result<Arc<dyn EmbeddingProvider>> {
    log::info!(
        "Creating embedding provider {} (model={})",
        kind,
        options.model.as_deref().unwrap_or(kind.default_model())
    );

    let provider: Arc<dyn EmbeddingProvider> = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(options)?),
        ProviderKind::Google => Arc::new(GoogleProvider::new(options)?),
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(options)),
        ProviderKind::Voyage => Arc::new(VoyageProvider::new(options)?),
    };
    Ok(provider)
}

pub(crate) fn require_api_key(
    explicit: Option<String>,
    env_var: &'static str,
    provider: &'static str,
) -> Result<String> {
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        return Ok(key);
    }
    std::env::var(env_var)
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or(EmbeddingError::MissingApiKey { provider, env_var })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!(ProviderKind::from_str("openai").unwrap(), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::from_str("OpenAI").unwrap(), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::from_str(" voyage ").unwrap(), ProviderKind::Voyage);
        assert!(matches!(
            ProviderKind::from_str("milvus"),
            Err(EmbeddingError::UnknownProvider(_))
        ));
    }

    #[test]
    fn default_models_match_vendor_defaults() {
        assert_eq!(ProviderKind::OpenAi.default_model(), "text-embedding-3-small");
        assert_eq!(ProviderKind::Google.default_model(), "gemini-embedding-001");
        assert_eq!(ProviderKind::Ollama.default_model(), "nomic-embed-text");
        assert_eq!(ProviderKind::Voyage.default_model(), "voyage-3-lite");
    }

    #[test]
    fn known_dimensions_cover_defaults() {
        for kind in [
            ProviderKind::OpenAi,
            ProviderKind::Google,
            ProviderKind::Ollama,
            ProviderKind::Voyage,
        ] {
            assert!(known_dimension(kind.default_model()).is_some());
        }
        assert_eq!(known_dimension("unknown-model"), None);
    }
}
