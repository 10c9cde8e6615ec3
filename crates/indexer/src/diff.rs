use std::collections::HashSet;

/// Outcome of comparing a file's current chunk identities against the
/// identities the store has recorded for that source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDiff {
    /// Recorded identities no longer produced by the file. Always deleted,
    /// `force` or not.
    pub stale: Vec<String>,
    /// Indices into the current chunk list that need embedding and storage.
    pub fresh: Vec<usize>,
    /// True when nothing needs embedding or storing; the whole file is a
    /// no-op apart from stale deletion (which is empty in that case too).
    pub up_to_date: bool,
}

/// Pure set diff between current and recorded chunk identities.
///
/// With `force`, every current chunk counts as fresh, but staleness is
/// unchanged: identities the file no longer produces are deleted either way.
#[must_use]
pub fn diff_identities(current: &[String], recorded: &HashSet<String>, force: bool) -> ChunkDiff {
    let current_set: HashSet<&str> = current.iter().map(String::as_str).collect();

    let mut stale: Vec<String> = recorded
        .iter()
        .filter(|id| !current_set.contains(id.as_str()))
        .cloned()
        .collect();
    stale.sort();

    let fresh: Vec<usize> = current
        .iter()
        .enumerate()
        .filter(|(_, id)| force || !recorded.contains(*id))
        .map(|(i, _)| i)
        .collect();

    let up_to_date = !force && fresh.is_empty() && stale.is_empty();
    ChunkDiff {
        stale,
        fresh,
        up_to_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn recorded(list: &[&str]) -> HashSet<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn unchanged_file_is_up_to_date() {
        let current = ids(&["a", "b"]);
        let diff = diff_identities(&current, &recorded(&["a", "b"]), false);
        assert!(diff.up_to_date);
        assert!(diff.stale.is_empty());
        assert!(diff.fresh.is_empty());
    }

    #[test]
    fn edited_section_is_fresh_and_old_identity_stale() {
        let current = ids(&["a", "b2", "c"]);
        let diff = diff_identities(&current, &recorded(&["a", "b", "c"]), false);
        assert_eq!(diff.stale, vec!["b".to_string()]);
        assert_eq!(diff.fresh, vec![1]);
        assert!(!diff.up_to_date);
    }

    #[test]
    fn new_file_is_entirely_fresh() {
        let current = ids(&["a", "b"]);
        let diff = diff_identities(&current, &HashSet::new(), false);
        assert_eq!(diff.fresh, vec![0, 1]);
        assert!(diff.stale.is_empty());
    }

    #[test]
    fn force_marks_everything_fresh_but_staleness_is_unchanged() {
        let current = ids(&["a", "b"]);
        let diff = diff_identities(&current, &recorded(&["a", "gone"]), true);
        assert_eq!(diff.fresh, vec![0, 1]);
        assert_eq!(diff.stale, vec!["gone".to_string()]);
        assert!(!diff.up_to_date);
    }

    #[test]
    fn empty_current_marks_all_recorded_stale() {
        let diff = diff_identities(&[], &recorded(&["a", "b"]), false);
        assert_eq!(diff.stale, vec!["a".to_string(), "b".to_string()]);
        assert!(diff.fresh.is_empty());
        assert!(!diff.up_to_date);
    }

    #[test]
    fn empty_everything_is_up_to_date() {
        let diff = diff_identities(&[], &HashSet::new(), false);
        assert!(diff.up_to_date);
    }
}
