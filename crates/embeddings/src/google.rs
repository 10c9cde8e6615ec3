//! Google (Gemini) embedding provider.
//!
//! Environment: `GOOGLE_API_KEY`.

use crate::error::{EmbeddingError, Result};
use crate::provider::{require_api_key, EmbeddingProvider, ProviderKind, ProviderOptions};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    batch_size: usize,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl GoogleProvider {
    pub fn new(options: ProviderOptions) -> Result<Self> {
        let api_key = require_api_key(options.api_key, "GOOGLE_API_KEY", "Google")?;
        let model = options
            .model
            .unwrap_or_else(|| ProviderKind::Google.default_model().to_string());
        // gemini-embedding-001 emits 3072 values by default; 768 is the
        // recommended working size, so vectors are truncated client-side.
        let dimension = options.dimension.unwrap_or(768);

        log::info!("Google provider initialized (model={model}, dimension={dimension})");

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
                .unwrap_or(ProviderKind::Google.default_batch_size()),
            dimension,
        })
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let requests: Vec<serde_json::Value> = batch
            .iter()
            .map(|text| {
                serde_json::json!({
                    "model": format!("models/{}", self.model),
                    "content": { "parts": [{ "text": text }] },
                })
            })
            .collect();
        let body = serde_json::json!({ "requests": requests });

        let url = format!(
            "{}/models/{}:batchEmbedContents",
            self.base_url, self.model
        );
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        match response.status().as_u16() {
            429 => return Err(EmbeddingError::RateLimited { provider: "Google" }),
            401 | 403 => return Err(EmbeddingError::AuthFailed { provider: "Google" }),
            404 => return Err(EmbeddingError::ModelNotFound(self.model.clone())),
            _ => {}
        }

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("Google: {detail}")));
        }

        let parsed: BatchEmbedResponse = response.json().await?;
        Ok(parsed
            .embeddings
            .into_iter()
            .map(|item| {
                let mut values = item.values;
                values.truncate(self.dimension);
                values
            })
            .collect())
    }
}

#[async_trait]
impl EmbeddingProvider for GoogleProvider {
    fn provider_name(&self) -> &'static str {
        "google"
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

        log::debug!("Embedding {} texts via Google ({})", texts.len(), self.model);

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
