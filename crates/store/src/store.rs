use crate::error::{Result, StoreError};
use crate::types::{SearchResult, StoredRecord};
use async_trait::async_trait;
use std::collections::HashSet;

/// Storage collaborator consumed by the indexing engine and the search
/// pipeline.
///
/// Implementations own the collection schema and ANN execution. Upserts must
/// be idempotent by `chunk_hash`. All operations may suspend on network I/O.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the backing collection if it does not exist yet.
    async fn ensure_collection(&self, dimension: usize) -> Result<()>;

    /// Insert-or-overwrite records by identity; returns the stored count.
    async fn upsert(&self, records: Vec<StoredRecord>) -> Result<usize>;

    /// Dense nearest-neighbor query, ranked best-first.
    async fn similarity_search(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Whether [`VectorStore::lexical_search`] is available.
    fn supports_lexical(&self) -> bool {
        false
    }

    /// Sparse lexical (e.g. BM25) query, ranked best-first.
    async fn lexical_search(&self, _query: &str, _top_k: usize) -> Result<Vec<SearchResult>> {
        Err(StoreError::LexicalUnsupported)
    }

    /// Remove every record for a source document.
    async fn delete_by_source(&self, source: &str) -> Result<()>;

    /// Remove records by chunk identity. Empty input is a no-op.
    async fn delete_by_identities(&self, identities: &[String]) -> Result<()>;

    /// All source paths with at least one record.
    async fn recorded_sources(&self) -> Result<HashSet<String>>;

    /// Identities currently recorded for one source.
    async fn identities_for_source(&self, source: &str) -> Result<HashSet<String>>;

    /// Total number of records in the collection.
    async fn count(&self) -> Result<usize>;

    /// Drop the collection and everything in it.
    async fn drop_collection(&self) -> Result<()>;
}
