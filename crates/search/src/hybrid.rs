use crate::error::{Result, SearchError};
use crate::fusion::{rrf_fuse, RRF_K};
use memsearch_embeddings::EmbeddingProvider;
use memsearch_store::{SearchResult, VectorStore};
use std::sync::Arc;

/// Hybrid query pipeline: embed the query, run dense similarity, and when the
/// store can do lexical search, fuse both rankings with RRF.
pub struct HybridSearch {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl HybridSearch {
    #[must_use]
    pub fn new(provider: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { provider, store }
    }

    /// Run a query and return at most `top_k` fused results, best first.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let vectors = self.provider.embed(&[query.to_string()]).await?;
        let vector = vectors
            .into_iter()
            .next()
            .ok_or(SearchError::MissingQueryVector)?;

        let dense = self.store.similarity_search(&vector, top_k).await?;

        let mut results = if self.store.supports_lexical() {
            match self.store.lexical_search(query, top_k).await {
                Ok(sparse) => rrf_fuse(dense, sparse, RRF_K),
                Err(err) => {
                    log::warn!("Lexical search failed ({err}); using dense results only");
                    dense
                }
            }
        } else {
            log::debug!("Store has no lexical search; using dense results only");
            dense
        };

        results.truncate(top_k);
        Ok(results)
    }
}
