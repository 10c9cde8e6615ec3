use serde::{Deserialize, Serialize};

/// Row stored in the vector collection, keyed by chunk identity.
///
/// Re-upserting the same identity overwrites the row, never duplicates it,
/// which is what keeps retried writes safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub chunk_hash: String,
    pub embedding: Vec<f32>,
    pub content: String,
    pub source: String,
    pub heading: String,
    pub heading_level: u8,
    pub start_line: usize,
    pub end_line: usize,
}

/// One ranked hit from a similarity or lexical query. Produced fresh per
/// query; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub content: String,
    pub source: String,
    pub heading: String,
    pub score: f32,
    pub start_line: usize,
    pub end_line: usize,
}
