use async_trait::async_trait;
use memsearch_embeddings::{EmbeddingProvider, Result as EmbeddingResult};
use memsearch_indexer::{source_key, Indexer};
use memsearch_store::{
    Result as StoreResult, SearchResult, StoreError, StoredRecord, VectorStore,
};
use pretty_assertions::assert_eq;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const DIM: usize = 4;

struct MockProvider {
    model: String,
    embed_calls: AtomicUsize,
    texts_embedded: AtomicUsize,
}

impl MockProvider {
    fn new(model: &str) -> Arc<Self> {
        Arc::new(Self {
            model: model.to_string(),
            embed_calls: AtomicUsize::new(0),
            texts_embedded: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|_| vec![0.1; DIM]).collect())
    }
}

#[derive(Default)]
struct MockStore {
    records: Mutex<HashMap<String, StoredRecord>>,
    upsert_calls: AtomicUsize,
    delete_source_calls: Mutex<Vec<String>>,
}

impl MockStore {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn sources(&self) -> HashSet<String> {
        self.records
            .lock()
            .unwrap()
            .values()
            .map(|r| r.source.clone())
            .collect()
    }
}

#[async_trait]
impl VectorStore for MockStore {
    async fn ensure_collection(&self, _dimension: usize) -> StoreResult<()> {
        Ok(())
    }

    async fn upsert(&self, records: Vec<StoredRecord>) -> StoreResult<usize> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let count = records.len();
        let mut map = self.records.lock().unwrap();
        for record in records {
            map.insert(record.chunk_hash.clone(), record);
        }
        Ok(count)
    }

    async fn similarity_search(
        &self,
        _vector: &[f32],
        _top_k: usize,
    ) -> StoreResult<Vec<SearchResult>> {
        Err(StoreError::Search("not used in these tests".into()))
    }

    async fn delete_by_source(&self, source: &str) -> StoreResult<()> {
        self.delete_source_calls
            .lock()
            .unwrap()
            .push(source.to_string());
        self.records
            .lock()
            .unwrap()
            .retain(|_, record| record.source != source);
        Ok(())
    }

    async fn delete_by_identities(&self, identities: &[String]) -> StoreResult<()> {
        let mut map = self.records.lock().unwrap();
        for id in identities {
            map.remove(id);
        }
        Ok(())
    }

    async fn recorded_sources(&self) -> StoreResult<HashSet<String>> {
        Ok(self.sources())
    }

    async fn identities_for_source(&self, source: &str) -> StoreResult<HashSet<String>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|record| record.source == source)
            .map(|record| record.chunk_hash.clone())
            .collect())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.record_count())
    }

    async fn drop_collection(&self) -> StoreResult<()> {
        self.records.lock().unwrap().clear();
        Ok(())
    }
}

fn write(path: &Path, text: &str) {
    std::fs::write(path, text).unwrap();
}

const TWO_SECTIONS: &str = "# Alpha\n\nfirst body\n\n# Beta\n\nsecond body\n";

#[tokio::test]
async fn second_run_embeds_and_upserts_nothing() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("a.md"), TWO_SECTIONS);
    write(&dir.path().join("b.md"), "# Gamma\n\nother\n");

    let provider = MockProvider::new("test-model");
    let store = MockStore::new();
    let indexer = Indexer::new(provider.clone(), store.clone());
    let roots = vec![dir.path().to_path_buf()];

    let first = indexer.index(&roots, false).await.unwrap();
    assert_eq!(first.files, 2);
    assert_eq!(first.stored, 3);
    let embeds_after_first = provider.embed_calls.load(Ordering::SeqCst);
    let upserts_after_first = store.upsert_calls.load(Ordering::SeqCst);

    let second = indexer.index(&roots, false).await.unwrap();
    assert_eq!(second.stored, 0);
    assert_eq!(provider.embed_calls.load(Ordering::SeqCst), embeds_after_first);
    assert_eq!(store.upsert_calls.load(Ordering::SeqCst), upserts_after_first);
}

#[tokio::test]
async fn editing_one_section_reembeds_only_that_section() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("doc.md");
    write(&file, TWO_SECTIONS);

    let provider = MockProvider::new("test-model");
    let store = MockStore::new();
    let indexer = Indexer::new(provider.clone(), store.clone());

    indexer.index(&[dir.path().to_path_buf()], false).await.unwrap();
    assert_eq!(store.record_count(), 2);
    let texts_after_first = provider.texts_embedded.load(Ordering::SeqCst);

    write(&file, "# Alpha\n\nfirst body\n\n# Beta\n\nsecond body, edited\n");
    let stored = indexer.index_file(&file, false).await.unwrap();

    assert_eq!(stored, 1);
    assert_eq!(provider.texts_embedded.load(Ordering::SeqCst), texts_after_first + 1);
    // The superseded identity is gone, not accumulated.
    assert_eq!(store.record_count(), 2);
}

#[tokio::test]
async fn changing_the_model_invalidates_every_chunk() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("doc.md"), TWO_SECTIONS);
    let roots = vec![dir.path().to_path_buf()];

    let store = MockStore::new();
    let first_provider = MockProvider::new("model-a");
    Indexer::new(first_provider, store.clone())
        .index(&roots, false)
        .await
        .unwrap();
    assert_eq!(store.record_count(), 2);

    let second_provider = MockProvider::new("model-b");
    let stats = Indexer::new(second_provider.clone(), store.clone())
        .index(&roots, false)
        .await
        .unwrap();

    assert_eq!(stats.stored, 2);
    assert_eq!(second_provider.texts_embedded.load(Ordering::SeqCst), 2);
    // Old-model identities were stale and deleted; no doubling.
    assert_eq!(store.record_count(), 2);
}

#[tokio::test]
async fn force_reembeds_an_unchanged_file() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("doc.md"), TWO_SECTIONS);
    let roots = vec![dir.path().to_path_buf()];

    let provider = MockProvider::new("test-model");
    let store = MockStore::new();
    let indexer = Indexer::new(provider.clone(), store.clone());

    indexer.index(&roots, false).await.unwrap();
    let stats = indexer.index(&roots, true).await.unwrap();

    assert_eq!(stats.stored, 2);
    assert_eq!(provider.texts_embedded.load(Ordering::SeqCst), 4);
    assert_eq!(store.record_count(), 2);
}

#[tokio::test]
async fn file_shrinking_to_zero_chunks_is_fully_cleaned_up() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("doc.md");
    write(&file, TWO_SECTIONS);

    let provider = MockProvider::new("test-model");
    let store = MockStore::new();
    let indexer = Indexer::new(provider, store.clone());

    indexer.index_file(&file, false).await.unwrap();
    assert_eq!(store.record_count(), 2);

    write(&file, "\n   \n");
    let stored = indexer.index_file(&file, false).await.unwrap();

    assert_eq!(stored, 0);
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn vanished_file_is_pruned_exactly_once() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("a.md"), "# A\n\nalpha\n");
    let b_path = dir.path().join("b.md");
    write(&b_path, "# B\n\nbeta\n");
    let roots = vec![dir.path().to_path_buf()];

    let provider = MockProvider::new("test-model");
    let store = MockStore::new();
    let indexer = Indexer::new(provider, store.clone());

    indexer.index(&roots, false).await.unwrap();
    assert_eq!(store.record_count(), 2);

    std::fs::remove_file(&b_path).unwrap();
    let stats = indexer.index(&roots, false).await.unwrap();

    assert_eq!(stats.pruned_sources, 1);
    let calls = store.delete_source_calls.lock().unwrap().clone();
    assert_eq!(calls, vec![source_key(&b_path)]);
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn per_file_failures_do_not_abort_the_run() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("good.md"), "# Good\n\nfine\n");
    // Invalid UTF-8 makes read_to_string fail for this file only.
    std::fs::write(dir.path().join("bad.md"), [0xff, 0xfe, 0xfd]).unwrap();

    let provider = MockProvider::new("test-model");
    let store = MockStore::new();
    let indexer = Indexer::new(provider, store.clone());

    let stats = indexer.index(&[dir.path().to_path_buf()], false).await.unwrap();

    assert_eq!(stats.errors.len(), 1);
    assert!(stats.errors[0].contains("bad.md"));
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn delete_source_removes_all_records_for_the_path() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("doc.md");
    write(&file, TWO_SECTIONS);

    let provider = MockProvider::new("test-model");
    let store = MockStore::new();
    let indexer = Indexer::new(provider, store.clone());

    indexer.index_file(&file, false).await.unwrap();
    indexer.delete_source(&file).await.unwrap();

    assert_eq!(store.record_count(), 0);
}
