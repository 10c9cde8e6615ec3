use memsearch_store::SearchResult;
use std::collections::HashMap;

/// RRF constant; dampens the gap between the top ranks.
pub const RRF_K: f32 = 60.0;

/// Reciprocal Rank Fusion over a dense and a sparse ranking.
///
/// Contribution per list: `1 / (k + rank + 1)` with zero-based rank. Only the
/// rank position counts; the stores' own scores never enter the formula.
/// Results are keyed by `(source, start_line)` so the same chunk found by
/// both lists accumulates one combined score. Ties keep first-insertion
/// order, dense list first.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn rrf_fuse(dense: Vec<SearchResult>, sparse: Vec<SearchResult>, k: f32) -> Vec<SearchResult> {
    let mut slots: HashMap<(String, usize), usize> = HashMap::new();
    let mut fused: Vec<(SearchResult, f32)> = Vec::with_capacity(dense.len() + sparse.len());

    for list in [dense, sparse] {
        for (rank, result) in list.into_iter().enumerate() {
            let contribution = 1.0 / (k + rank as f32 + 1.0);
            let key = (result.source.clone(), result.start_line);
            match slots.get(&key) {
                Some(&slot) => fused[slot].1 += contribution,
                None => {
                    slots.insert(key, fused.len());
                    fused.push((result, contribution));
                }
            }
        }
    }

    // Stable sort keeps insertion order among equal scores.
    fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    fused
        .into_iter()
        .map(|(mut result, score)| {
            result.score = score;
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hit(source: &str, start_line: usize, score: f32) -> SearchResult {
        SearchResult {
            content: format!("content of {source}:{start_line}"),
            source: source.to_string(),
            heading: "H".to_string(),
            score,
            start_line,
            end_line: start_line + 2,
        }
    }

    #[test]
    fn overlap_ranks_first_and_sparse_only_hits_survive() {
        let dense = vec![hit("a.md", 1, 0.9), hit("b.md", 1, 0.8), hit("c.md", 1, 0.7)];
        let sparse = vec![hit("b.md", 1, 5.0), hit("d.md", 1, 4.0)];

        let fused = rrf_fuse(dense, sparse, RRF_K);
        let sources: Vec<&str> = fused.iter().map(|r| r.source.as_str()).collect();

        assert_eq!(sources[0], "b.md");
        assert!(sources.contains(&"d.md"));
        assert_eq!(fused.len(), 4);
    }

    #[test]
    fn original_scores_are_ignored() {
        // Dense rank 0 wins even with a tiny raw score.
        let dense = vec![hit("a.md", 1, 0.0001), hit("b.md", 1, 0.00005)];
        let sparse = vec![];

        let fused = rrf_fuse(dense, sparse, RRF_K);
        assert_eq!(fused[0].source, "a.md");
        assert!(fused[0].score > fused[1].score);
    }

    #[test]
    fn ties_keep_insertion_order() {
        // Same rank in disjoint lists gives identical scores.
        let dense = vec![hit("a.md", 1, 0.9)];
        let sparse = vec![hit("z.md", 1, 0.9)];

        let fused = rrf_fuse(dense, sparse, RRF_K);
        assert_eq!(fused[0].source, "a.md");
        assert_eq!(fused[1].source, "z.md");
        assert_eq!(fused[0].score, fused[1].score);
    }

    #[test]
    fn same_source_different_sections_stay_separate() {
        let dense = vec![hit("a.md", 1, 0.9), hit("a.md", 10, 0.8)];
        let fused = rrf_fuse(dense, vec![], RRF_K);
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn empty_inputs_fuse_to_empty() {
        assert!(rrf_fuse(vec![], vec![], RRF_K).is_empty());
    }
}
