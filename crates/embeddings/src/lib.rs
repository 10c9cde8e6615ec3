//! # MemSearch Embeddings
//!
//! Batch embedding providers behind one capability trait.
//!
//! Providers are a closed set of variants selected by [`ProviderKind`]; new
//! vendors are added as variants, never by branching on strings downstream.
//!
//! ## Example
//!
//! ```no_run
//! use memsearch_embeddings::{create_provider, ProviderKind, ProviderOptions, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let provider = create_provider(ProviderKind::OpenAi, ProviderOptions::default())?;
//!     let vectors = provider.embed(&["hello".to_string()]).await?;
//!     assert_eq!(vectors.len(), 1);
//!     Ok(())
//! }
//! ```

mod error;
mod google;
mod ollama;
mod openai;
mod provider;
mod voyage;

pub use error::{EmbeddingError, Result};
pub use google::GoogleProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::{
    create_provider, known_dimension, EmbeddingProvider, ProviderKind, ProviderOptions,
};
pub use voyage::VoyageProvider;
