//! Voyage AI embedding provider.
//!
//! Environment: `VOYAGE_API_KEY`.

use crate::error::{EmbeddingError, Result};
use crate::provider::{
    known_dimension, require_api_key, EmbeddingProvider, ProviderKind, ProviderOptions,
};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.voyageai.com/v1";

pub struct VoyageProvider {
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

impl VoyageProvider {
    pub fn new(options: ProviderOptions) -> Result<Self> {
        let api_key = require_api_key(options.api_key, "VOYAGE_API_KEY", "Voyage")?;
        let model = options
            .model
            .unwrap_or_else(|| ProviderKind::Voyage.default_model().to_string());
        let dimension = options
            .dimension
            .or_else(|| known_dimension(&model))
            .unwrap_or(1024);

        log::info!("Voyage provider initialized (model={model}, dimension={dimension})");

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: options
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            batch_size: options
                .batch_size
                .filter(|n| *n > 0)
                .unwrap_or(ProviderKind::Voyage.default_batch_size()),
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
            429 => return Err(EmbeddingError::RateLimited { provider: "Voyage" }),
            401 => return Err(EmbeddingError::AuthFailed { provider: "Voyage" }),
            404 => return Err(EmbeddingError::ModelNotFound(self.model.clone())),
            _ => {}
        }

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("Voyage: {detail}")));
        }

        let parsed: EmbeddingResponse = response.json().await?;

        // Rows carry an index; sort to restore submission order.
        let mut data = parsed.data;
        data.sort_by_key(|item| item.index);
        Ok(data.into_iter().map(|item| item.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for VoyageProvider {
    fn provider_name(&self) -> &'static str {
        "voyage"
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

        log::debug!("Embedding {} texts via Voyage ({})", texts.len(), self.model);

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
