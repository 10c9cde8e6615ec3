//! # MemSearch Chunker
//!
//! Markdown chunking for semantic memory search.
//!
//! ## Pipeline
//!
//! ```text
//! Markdown text
//!     │
//!     ├──> Heading scan (#{1,6} lines)
//!     │      └─> Sections
//!     │
//!     └──> Chunks (content hash + stable identity)
//! ```
//!
//! ## Example
//!
//! ```
//! use memsearch_chunker::{chunk_markdown, chunk_id};
//!
//! let chunks = chunk_markdown("# Title\n\nBody", "notes.md");
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].heading, "Title");
//!
//! let id = chunk_id("notes.md", 1, 3, &chunks[0].content_hash, "text-embedding-3-small");
//! assert_eq!(id.len(), 16);
//! ```

mod chunk;
mod identity;
mod markdown;

pub use chunk::Chunk;
pub use identity::{chunk_id, content_hash};
pub use markdown::chunk_markdown;
