//! # MemSearch Indexer
//!
//! Incremental indexing of markdown trees into a vector store.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (.md / .markdown)
//!     │      └─> Source files
//!     │
//!     ├──> Chunker (heading sections)
//!     │      └─> Chunk identities
//!     │
//!     ├──> Diff (current vs recorded)
//!     │      └─> stale / fresh
//!     │
//!     └──> Embed fresh + upsert
//! ```
//!
//! Re-running over an unchanged tree performs zero embedding calls and zero
//! upserts. [`start_watcher`] drives the same per-file path from debounced
//! filesystem events.

mod diff;
mod error;
mod indexer;
mod scanner;
mod stats;
mod watcher;

pub use diff::{diff_identities, ChunkDiff};
pub use error::{IndexerError, Result};
pub use indexer::{source_key, Indexer};
pub use scanner::{FileScanner, ScannedFile};
pub use stats::IndexStats;
pub use watcher::{
    start_watcher, WatchEventKind, WatchHandle, WatchObserver, WatcherConfig,
};
