use serde::{Deserialize, Serialize};

/// A contiguous, heading-aligned span of one markdown document.
///
/// Chunks are created fresh on every chunking pass and never mutated; they are
/// converted into store records or compared for identity, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Raw section content, including the heading line itself.
    pub content: String,

    /// Source document path.
    pub source: String,

    /// Section heading title; empty for a preamble before the first heading.
    pub heading: String,

    /// Heading depth 1-6, or 0 when there is no enclosing heading.
    pub heading_level: u8,

    /// First line of the section, 1-indexed.
    pub start_line: usize,

    /// Last line of the section, 1-indexed, inclusive.
    pub end_line: usize,

    /// 16-hex-char digest of `content`.
    pub content_hash: String,
}

impl Chunk {
    /// Identity under the given embedding model. Changing the model changes
    /// every identity, which forces re-embedding (vectors are not comparable
    /// across models).
    #[must_use]
    pub fn identity(&self, model: &str) -> String {
        crate::identity::chunk_id(
            &self.source,
            self.start_line,
            self.end_line,
            &self.content_hash,
            model,
        )
    }
}
