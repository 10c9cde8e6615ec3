use sha2::{Digest, Sha256};

/// Hex length of truncated digests. 64 bits of SHA-256 is enough for
/// uniqueness at practical index sizes; collision resistance is not a
/// security property here.
const DIGEST_LEN: usize = 16;

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Content hash of a chunk body: SHA-256 truncated to 16 hex chars.
#[must_use]
pub fn content_hash(content: &str) -> String {
    let mut hex = sha256_hex(content);
    hex.truncate(DIGEST_LEN);
    hex
}

/// Composite chunk identity: hash of
/// `markdown:source:startLine:endLine:contentHash:model`, truncated to 16 hex
/// chars. The store uses this as its primary key.
#[must_use]
pub fn chunk_id(
    source: &str,
    start_line: usize,
    end_line: usize,
    content_hash: &str,
    model: &str,
) -> String {
    let raw = format!("markdown:{source}:{start_line}:{end_line}:{content_hash}:{model}");
    let mut hex = sha256_hex(&raw);
    hex.truncate(DIGEST_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn content_hash_is_deterministic() {
        assert_eq!(content_hash("hello"), content_hash("hello"));
        assert_eq!(content_hash("hello").len(), 16);
    }

    #[test]
    fn distinct_inputs_give_distinct_hashes() {
        let samples = ["", "a", "b", "hello", "hello ", "# Title\n\nBody"];
        for (i, a) in samples.iter().enumerate() {
            for b in &samples[i + 1..] {
                assert_ne!(content_hash(a), content_hash(b), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn chunk_id_is_deterministic() {
        let a = chunk_id("x.md", 1, 10, "abcd1234abcd1234", "model-a");
        let b = chunk_id("x.md", 1, 10, "abcd1234abcd1234", "model-a");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn chunk_id_depends_on_every_input() {
        let base = chunk_id("x.md", 1, 10, "abcd1234abcd1234", "model-a");
        assert_ne!(base, chunk_id("y.md", 1, 10, "abcd1234abcd1234", "model-a"));
        assert_ne!(base, chunk_id("x.md", 2, 10, "abcd1234abcd1234", "model-a"));
        assert_ne!(base, chunk_id("x.md", 1, 11, "abcd1234abcd1234", "model-a"));
        assert_ne!(base, chunk_id("x.md", 1, 10, "ffff1234abcd1234", "model-a"));
        assert_ne!(base, chunk_id("x.md", 1, 10, "abcd1234abcd1234", "model-b"));
    }
}
