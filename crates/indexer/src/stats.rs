use serde::Serialize;

/// Counters accumulated over one indexing run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    /// Files visited (including up-to-date ones).
    pub files: usize,
    /// Chunks produced by the markdown splitter across all visited files.
    pub chunks: usize,
    /// Records newly embedded and stored this run.
    pub stored: usize,
    /// Sources pruned because they vanished from the scanned tree.
    pub pruned_sources: usize,
    /// Per-file failure messages; a failure never aborts the run.
    pub errors: Vec<String>,
    pub time_ms: u64,
}

impl IndexStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, chunks: usize, stored: usize) {
        self.files += 1;
        self.chunks += chunks;
        self.stored += stored;
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accumulates_counters() {
        let mut stats = IndexStats::new();
        stats.add_file(3, 2);
        stats.add_file(1, 0);
        stats.add_error("bad.md: read failed");

        assert_eq!(stats.files, 2);
        assert_eq!(stats.chunks, 4);
        assert_eq!(stats.stored, 2);
        assert!(stats.has_errors());
    }
}
