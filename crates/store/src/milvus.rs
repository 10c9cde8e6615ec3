//! Milvus REST (v2) client.
//!
//! Collection layout mirrors the `memsearch_chunks` schema: `chunk_hash`
//! primary key, dense `embedding` vector, `content` with an analyzer feeding a
//! BM25 `sparse_vector` for lexical search, plus chunk metadata columns.

use crate::error::{Result, StoreError};
use crate::store::VectorStore;
use crate::types::{SearchResult, StoredRecord};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const QUERY_PAGE_LIMIT: usize = 10_000;

#[derive(Debug, Clone)]
pub struct MilvusConfig {
    /// Base URL of the Milvus HTTP endpoint, e.g. `http://localhost:19530`.
    pub uri: String,
    pub token: Option<String>,
    pub collection: String,
    pub timeout_ms: u64,
}

impl MilvusConfig {
    #[must_use]
    pub fn new(uri: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            uri: normalize_base_url(&uri.into()),
            token: None,
            collection: collection.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        if !token.is_empty() {
            self.token = Some(token);
        }
        self
    }
}

pub struct MilvusStore {
    config: MilvusConfig,
    http: reqwest::Client,
}

impl std::fmt::Debug for MilvusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MilvusStore")
            .field("uri", &self.config.uri)
            .field("collection", &self.config.collection)
            .finish_non_exhaustive()
    }
}

impl MilvusStore {
    pub fn new(config: MilvusConfig) -> Result<Self> {
        log::info!(
            "Initializing MilvusStore (uri={}, collection={})",
            config.uri,
            config.collection
        );
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { config, http })
    }

    /// POST a v2 vectordb request and unwrap the `{code, data}` envelope.
    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let url = format!("{}/v2/vectordb{path}", self.config.uri);
        let mut request = self.http.post(url).json(&body);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Connection(format!(
                "Milvus returned HTTP {status} for {path}"
            )));
        }

        let envelope: Value = response.json().await?;
        let code = envelope.get("code").and_then(Value::as_i64).unwrap_or(-1);
        if code != 0 {
            let message = envelope
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(StoreError::InvalidResponse(format!(
                "Milvus code {code} for {path}: {message}"
            )));
        }
        Ok(envelope.get("data").cloned().unwrap_or(Value::Null))
    }

    async fn has_collection(&self) -> Result<bool> {
        let data = self
            .post(
                "/collections/has",
                json!({ "collectionName": self.config.collection }),
            )
            .await?;
        Ok(data.get("has").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn delete_by_filter(&self, filter: String) -> Result<()> {
        self.post(
            "/entities/delete",
            json!({
                "collectionName": self.config.collection,
                "filter": filter,
            }),
        )
        .await
        .map_err(|e| StoreError::Delete(e.to_string()))?;
        Ok(())
    }

    async fn query(&self, filter: &str, output_fields: &[&str]) -> Result<Vec<Value>> {
        let data = self
            .post(
                "/entities/query",
                json!({
                    "collectionName": self.config.collection,
                    "filter": filter,
                    "outputFields": output_fields,
                    "limit": QUERY_PAGE_LIMIT,
                }),
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        match data {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Err(StoreError::InvalidResponse(format!(
                "expected row array from query, got {other}"
            ))),
        }
    }

    async fn run_search(&self, body: Value) -> Result<Vec<SearchResult>> {
        let data = self
            .post("/entities/search", body)
            .await
            .map_err(|e| StoreError::Search(e.to_string()))?;
        let rows = match data {
            Value::Array(rows) => rows,
            Value::Null => Vec::new(),
            other => {
                return Err(StoreError::InvalidResponse(format!(
                    "expected row array from search, got {other}"
                )))
            }
        };
        Ok(rows.iter().map(result_from_row).collect())
    }
}

#[async_trait]
impl VectorStore for MilvusStore {
    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        if self.has_collection().await? {
            log::debug!("Collection {} exists", self.config.collection);
            return Ok(());
        }

        let body = json!({
            "collectionName": self.config.collection,
            "schema": {
                "fields": [
                    { "fieldName": "chunk_hash", "dataType": "VarChar", "isPrimary": true,
                      "elementTypeParams": { "max_length": 64 } },
                    { "fieldName": "embedding", "dataType": "FloatVector",
                      "elementTypeParams": { "dim": dimension } },
                    { "fieldName": "content", "dataType": "VarChar",
                      "elementTypeParams": { "max_length": 65535, "enable_analyzer": true } },
                    { "fieldName": "sparse_vector", "dataType": "SparseFloatVector" },
                    { "fieldName": "source", "dataType": "VarChar",
                      "elementTypeParams": { "max_length": 1024 } },
                    { "fieldName": "heading", "dataType": "VarChar",
                      "elementTypeParams": { "max_length": 1024 } },
                    { "fieldName": "heading_level", "dataType": "Int64" },
                    { "fieldName": "start_line", "dataType": "Int64" },
                    { "fieldName": "end_line", "dataType": "Int64" }
                ],
                "functions": [
                    { "name": "content_bm25", "type": "BM25",
                      "inputFieldNames": ["content"],
                      "outputFieldNames": ["sparse_vector"] }
                ]
            },
            "indexParams": [
                { "fieldName": "embedding", "indexType": "FLAT", "metricType": "COSINE" },
                { "fieldName": "sparse_vector", "indexType": "SPARSE_INVERTED_INDEX",
                  "metricType": "BM25" }
            ]
        });

        self.post("/collections/create", body)
            .await
            .map_err(|e| StoreError::Connection(format!("failed to create collection: {e}")))?;
        log::info!("Collection {} created (dim={dimension})", self.config.collection);
        Ok(())
    }

    async fn upsert(&self, records: Vec<StoredRecord>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let count = records.len();
        let data: Vec<Value> = records
            .into_iter()
            .map(|r| {
                json!({
                    "chunk_hash": r.chunk_hash,
                    "embedding": r.embedding,
                    "content": r.content,
                    "source": r.source,
                    "heading": r.heading,
                    "heading_level": r.heading_level,
                    "start_line": r.start_line,
                    "end_line": r.end_line,
                })
            })
            .collect();

        let result = self
            .post(
                "/entities/upsert",
                json!({
                    "collectionName": self.config.collection,
                    "data": data,
                }),
            )
            .await
            .map_err(|e| StoreError::Upsert(e.to_string()))?;

        let stored = result
            .get("upsertCount")
            .and_then(Value::as_u64)
            .map_or(count, |n| n as usize);
        log::info!("Upserted {stored} records");
        Ok(stored)
    }

    async fn similarity_search(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        self.run_search(json!({
            "collectionName": self.config.collection,
            "data": [vector],
            "annsField": "embedding",
            "limit": top_k,
            "outputFields": ["content", "source", "heading", "heading_level",
                             "start_line", "end_line"],
        }))
        .await
    }

    fn supports_lexical(&self) -> bool {
        true
    }

    async fn lexical_search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        // Full-text search: the BM25 function embeds the raw query string
        // server-side into the sparse field.
        self.run_search(json!({
            "collectionName": self.config.collection,
            "data": [query],
            "annsField": "sparse_vector",
            "limit": top_k,
            "outputFields": ["content", "source", "heading", "heading_level",
                             "start_line", "end_line"],
        }))
        .await
    }

    async fn delete_by_source(&self, source: &str) -> Result<()> {
        self.delete_by_filter(format!("source == \"{}\"", escape_filter_value(source)))
            .await?;
        log::info!("Deleted records for source {source}");
        Ok(())
    }

    async fn delete_by_identities(&self, identities: &[String]) -> Result<()> {
        if identities.is_empty() {
            return Ok(());
        }
        let quoted: Vec<String> = identities
            .iter()
            .map(|id| format!("\"{}\"", escape_filter_value(id)))
            .collect();
        self.delete_by_filter(format!("chunk_hash in [{}]", quoted.join(",")))
            .await?;
        log::debug!("Deleted {} records by identity", identities.len());
        Ok(())
    }

    async fn recorded_sources(&self) -> Result<HashSet<String>> {
        let rows = self.query("", &["source"]).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("source").and_then(Value::as_str))
            .map(ToString::to_string)
            .collect())
    }

    async fn identities_for_source(&self, source: &str) -> Result<HashSet<String>> {
        let filter = format!("source == \"{}\"", escape_filter_value(source));
        let rows = self.query(&filter, &["chunk_hash"]).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("chunk_hash").and_then(Value::as_str))
            .map(ToString::to_string)
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        let rows = self.query("", &["count(*)"]).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("count(*)"))
            .and_then(count_value)
            .unwrap_or(0))
    }

    async fn drop_collection(&self) -> Result<()> {
        self.post(
            "/collections/drop",
            json!({ "collectionName": self.config.collection }),
        )
        .await
        .map_err(|e| StoreError::Connection(format!("failed to drop collection: {e}")))?;
        log::info!("Collection {} dropped", self.config.collection);
        Ok(())
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim_end_matches('/').to_string()
}

/// Milvus filter expressions are string-quoted; escape the two characters
/// that would break out of the literal.
fn escape_filter_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn count_value(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn result_from_row(row: &Value) -> SearchResult {
    let get_str = |key: &str| {
        row.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let get_usize = |key: &str| {
        row.get(key)
            .and_then(Value::as_u64)
            .map_or(0, |n| n as usize)
    };

    SearchResult {
        content: get_str("content"),
        source: get_str("source"),
        heading: get_str("heading"),
        score: row
            .get("distance")
            .and_then(Value::as_f64)
            .map_or(0.0, |s| s as f32),
        start_line: get_usize("start_line"),
        end_line: get_usize("end_line"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn base_url_is_normalized() {
        let config = MilvusConfig::new("http://localhost:19530/", "memsearch_chunks");
        assert_eq!(config.uri, "http://localhost:19530");
    }

    #[test]
    fn empty_token_is_dropped() {
        let config = MilvusConfig::new("http://localhost:19530", "c").with_token("");
        assert!(config.token.is_none());
    }

    #[test]
    fn filter_values_are_escaped() {
        assert_eq!(escape_filter_value(r#"a"b"#), r#"a\"b"#);
        assert_eq!(escape_filter_value(r"a\b"), r"a\\b");
    }

    #[test]
    fn search_rows_map_to_results() {
        let row = serde_json::json!({
            "content": "body",
            "source": "notes.md",
            "heading": "Title",
            "heading_level": 1,
            "start_line": 3,
            "end_line": 9,
            "distance": 0.42,
        });
        let result = result_from_row(&row);
        assert_eq!(result.source, "notes.md");
        assert_eq!(result.start_line, 3);
        assert_eq!(result.end_line, 9);
        assert!((result.score - 0.42).abs() < 1e-6);
    }

    #[test]
    fn count_value_accepts_number_and_string() {
        assert_eq!(count_value(&serde_json::json!(7)), Some(7));
        assert_eq!(count_value(&serde_json::json!("12")), Some(12));
        assert_eq!(count_value(&serde_json::json!(null)), None);
    }
}
