//! # MemSearch Search
//!
//! Query-side pipeline: hybrid dense + lexical retrieval with Reciprocal
//! Rank Fusion. Stores that cannot do lexical search degrade to dense-only
//! results transparently.

mod error;
mod fusion;
mod hybrid;

pub use error::{Result, SearchError};
pub use fusion::{rrf_fuse, RRF_K};
pub use hybrid::HybridSearch;
pub use memsearch_store::SearchResult;
