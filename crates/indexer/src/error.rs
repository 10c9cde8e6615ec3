use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Embedding error: {0}")]
    Embedding(#[from] memsearch_embeddings::EmbeddingError),

    #[error("Store error: {0}")]
    Store(#[from] memsearch_store::StoreError),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}
