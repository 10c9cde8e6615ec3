//! OpenAI embedding provider.
//!
//! Environment: `OPENAI_API_KEY`, `OPENAI_BASE_URL` (optional).

use crate::error::{EmbeddingError, Result};
use crate::provider::{
    known_dimension, require_api_key, EmbeddingProvider, ProviderKind, ProviderOptions,
};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    batch_size: usize,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl OpenAiProvider {
    pub fn new(options: ProviderOptions) -> Result<Self> {
        let api_key = require_api_key(options.api_key, "OPENAI_API_KEY", "OpenAI")?;
        let base_url = options
            .base_url
            .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = options
            .model
            .unwrap_or_else(|| ProviderKind::OpenAi.default_model().to_string());
        let dimension = options
            .dimension
            .or_else(|| known_dimension(&model))
            .unwrap_or(1536);

        log::info!("OpenAI provider initialized (model={model}, dimension={dimension})");

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model,
            batch_size: options
                .batch_size
                .filter(|n| *n > 0)
                .unwrap_or(ProviderKind::OpenAi.default_batch_size()),
            dimension,
        })
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": batch,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        match response.status().as_u16() {
            429 => return Err(EmbeddingError::RateLimited { provider: "OpenAI" }),
            401 => return Err(EmbeddingError::AuthFailed { provider: "OpenAI" }),
            404 => return Err(EmbeddingError::ModelNotFound(self.model.clone())),
            _ => {}
        }

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("OpenAI: {detail}")));
        }

        let parsed: EmbeddingResponse = response.json().await?;

        // The API documents index-annotated rows; sort to be safe.
        let mut data = parsed.data;
        data.sort_by_key(|item| item.index);
        Ok(data.into_iter().map(|item| item.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn provider_name(&self) -> &'static str {
        "openai"
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

        log::debug!("Embedding {} texts via OpenAI ({})", texts.len(), self.model);

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
