use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Embedding error: {0}")]
    Embedding(#[from] memsearch_embeddings::EmbeddingError),

    #[error("Store error: {0}")]
    Store(#[from] memsearch_store::StoreError),

    #[error("Embedding provider returned no vector for the query")]
    MissingQueryVector,
}
