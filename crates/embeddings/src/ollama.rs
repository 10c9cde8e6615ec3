//! Ollama embedding provider (local).
//!
//! Environment: `OLLAMA_HOST` (optional, defaults to `http://localhost:11434`).
//! No API key needed.

use crate::error::{EmbeddingError, Result};
use crate::provider::{known_dimension, EmbeddingProvider, ProviderKind, ProviderOptions};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_HOST: &str = "http://localhost:11434";

pub struct OllamaProvider {
    client: reqwest::Client,
    host: String,
    model: String,
    batch_size: usize,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaProvider {
    #[must_use]
    pub fn new(options: ProviderOptions) -> Self {
        let host = options
            .base_url
            .or_else(|| std::env::var("OLLAMA_HOST").ok())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let model = options
            .model
            .unwrap_or_else(|| ProviderKind::Ollama.default_model().to_string());
        let dimension = options
            .dimension
            .or_else(|| known_dimension(&model))
            .unwrap_or(768);

        log::info!("Ollama provider initialized (model={model}, host={host})");

        Self {
            client: reqwest::Client::new(),
            host,
            model,
            batch_size: options
                .batch_size
                .filter(|n| *n > 0)
                .unwrap_or(ProviderKind::Ollama.default_batch_size()),
            dimension,
        }
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": batch,
        });

        let response = self
            .client
            .post(format!("{}/api/embed", self.host))
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() {
                    EmbeddingError::Api(format!(
                        "Cannot connect to Ollama at {}. Make sure Ollama is running",
                        self.host
                    ))
                } else {
                    EmbeddingError::Transport(err)
                }
            })?;

        if response.status().as_u16() == 404 {
            return Err(EmbeddingError::ModelNotFound(format!(
                "{}. Run: ollama pull {}",
                self.model, self.model
            )));
        }

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("Ollama: {detail}")));
        }

        let parsed: EmbedResponse = response.json().await?;
        Ok(parsed.embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        log::debug!("Embedding {} texts via Ollama ({})", texts.len(), self.model);

        let mut all = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            all.extend(self.embed_batch(batch).await?);
        }

        if all.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                got: all.len(),
            });
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_input_embeds_to_empty_without_network() {
        let provider = OllamaProvider::new(ProviderOptions::default());
        assert!(provider.embed(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn explicit_base_url_beats_default() {
        let provider = OllamaProvider::new(ProviderOptions {
            base_url: Some("http://ollama.internal:11434".to_string()),
            ..ProviderOptions::default()
        });
        assert_eq!(provider.host, "http://ollama.internal:11434");
        assert_eq!(provider.model_name(), "nomic-embed-text");
    }
}
