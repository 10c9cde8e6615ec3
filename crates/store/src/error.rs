use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Upsert failed: {0}")]
    Upsert(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid store response: {0}")]
    InvalidResponse(String),

    #[error("Lexical search is not supported by this store")]
    LexicalUnsupported,
}
