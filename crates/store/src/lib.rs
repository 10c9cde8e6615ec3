//! # MemSearch Store
//!
//! Vector storage collaborator interface and the Milvus-backed implementation.
//!
//! The indexing engine only ever upserts records and deletes by identity or by
//! source; similarity execution, index builds, and collection schema belong to
//! the store behind the [`VectorStore`] trait.

mod error;
mod milvus;
mod store;
mod types;

pub use error::{Result, StoreError};
pub use milvus::{MilvusConfig, MilvusStore};
pub use store::VectorStore;
pub use types::{SearchResult, StoredRecord};
