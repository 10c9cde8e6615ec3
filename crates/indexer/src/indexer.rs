use crate::diff::diff_identities;
use crate::error::Result;
use crate::scanner::{FileScanner, ScannedFile};
use crate::stats::IndexStats;
use memsearch_chunker::{chunk_markdown, Chunk};
use memsearch_embeddings::{EmbeddingError, EmbeddingProvider};
use memsearch_store::{StoredRecord, VectorStore};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex as TokioMutex;

/// Index coordinator: scans markdown trees, diffs chunk identities against
/// the store, embeds only what changed, and prunes vanished sources.
///
/// Writes for one source path are serialized through a per-path async mutex,
/// so a watcher flush and a manual index of the same file never interleave.
pub struct Indexer {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    cancel: Arc<AtomicBool>,
    path_locks: TokioMutex<HashMap<String, Arc<TokioMutex<()>>>>,
}

impl Indexer {
    #[must_use]
    pub fn new(provider: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            provider,
            store,
            cancel: Arc::new(AtomicBool::new(false)),
            path_locks: TokioMutex::new(HashMap::new()),
        }
    }

    /// Flag checked between files during [`Indexer::index`]. Setting it stops
    /// the run after the in-flight file completes; no partial file state is
    /// ever stored.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Index every markdown file under the given roots.
    ///
    /// Per-file failures are recorded in the returned [`IndexStats`] and the
    /// run continues. After the scan, sources recorded in the store that live
    /// under a scanned directory but were not seen are deleted once each.
    pub async fn index(&self, roots: &[PathBuf], force: bool) -> Result<IndexStats> {
        let started = Instant::now();
        let mut stats = IndexStats::new();
        self.cancel.store(false, Ordering::Relaxed);

        self.store
            .ensure_collection(self.provider.dimension())
            .await?;

        let mut files: Vec<ScannedFile> = Vec::new();
        let mut dir_prefixes: Vec<String> = Vec::new();
        for root in roots {
            if root.is_dir() {
                let mut prefix = source_key(root);
                if !prefix.ends_with('/') {
                    prefix.push('/');
                }
                dir_prefixes.push(prefix);
            }
            files.extend(FileScanner::new(root).scan()?);
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);

        log::info!(
            "Indexing {} markdown files (model={}, force={force})",
            files.len(),
            self.provider.model_name()
        );

        let mut seen: HashSet<String> = HashSet::with_capacity(files.len());
        for file in &files {
            if self.cancel.load(Ordering::Relaxed) {
                log::warn!("Indexing cancelled; {} files processed", stats.files);
                break;
            }
            seen.insert(source_key(&file.path));
            match self.index_file_counts(&file.path, force).await {
                Ok((chunks, stored)) => stats.add_file(chunks, stored),
                Err(err) => {
                    log::warn!("Failed to index {}: {err}", file.path.display());
                    stats.add_error(format!("{}: {err}", file.path.display()));
                }
            }
        }

        if !self.cancel.load(Ordering::Relaxed) {
            self.prune_missing_sources(&dir_prefixes, &seen, &mut stats)
                .await;
        }

        stats.time_ms = started.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
        log::info!(
            "Indexing finished: {} files, {} chunks, {} stored, {} pruned, {} errors in {}ms",
            stats.files,
            stats.chunks,
            stats.stored,
            stats.pruned_sources,
            stats.errors.len(),
            stats.time_ms
        );
        Ok(stats)
    }

    /// Index a single file; returns the number of newly stored records.
    ///
    /// Recorded identities the file no longer produces are deleted first, so
    /// a file that shrank to zero chunks still gets fully cleaned up. An
    /// unchanged file performs zero embedding calls and zero upserts.
    pub async fn index_file(&self, path: &Path, force: bool) -> Result<usize> {
        let (_, stored) = self.index_file_counts(path, force).await?;
        Ok(stored)
    }

    async fn index_file_counts(&self, path: &Path, force: bool) -> Result<(usize, usize)> {
        let source = source_key(path);
        let lock = self.lock_for(&source).await;
        let _guard = lock.lock().await;

        let text = tokio::fs::read_to_string(path).await?;
        let chunks = chunk_markdown(&text, &source);
        let model = self.provider.model_name();
        let identities: Vec<String> = chunks.iter().map(|c| c.identity(model)).collect();

        let recorded = self.store.identities_for_source(&source).await?;
        let diff = diff_identities(&identities, &recorded, force);

        if !diff.stale.is_empty() {
            log::debug!("{source}: deleting {} stale chunks", diff.stale.len());
            self.store.delete_by_identities(&diff.stale).await?;
        }

        if diff.up_to_date {
            log::debug!("{source}: up to date");
            return Ok((chunks.len(), 0));
        }
        if diff.fresh.is_empty() {
            return Ok((chunks.len(), 0));
        }

        let records = self.embed_chunks(&chunks, &identities, &diff.fresh).await?;
        let stored = self.store.upsert(records).await?;
        log::info!("{source}: {stored} chunks stored");
        Ok((chunks.len(), stored))
    }

    /// Remove every record for a source path without reading the file.
    pub async fn delete_source(&self, path: &Path) -> Result<()> {
        let source = source_key(path);
        let lock = self.lock_for(&source).await;
        let _guard = lock.lock().await;
        self.store.delete_by_source(&source).await?;
        Ok(())
    }

    /// Embed the fresh subset and zip chunk, vector, and identity into
    /// records. A provider failure aborts the whole batch; nothing partial
    /// reaches the store.
    async fn embed_chunks(
        &self,
        chunks: &[Chunk],
        identities: &[String],
        fresh: &[usize],
    ) -> Result<Vec<StoredRecord>> {
        let texts: Vec<String> = fresh.iter().map(|&i| chunks[i].content.clone()).collect();
        let vectors = self.provider.embed(&texts).await?;
        if vectors.len() != fresh.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: fresh.len(),
                got: vectors.len(),
            }
            .into());
        }

        Ok(fresh
            .iter()
            .zip(vectors)
            .map(|(&i, embedding)| {
                let chunk = &chunks[i];
                StoredRecord {
                    chunk_hash: identities[i].clone(),
                    embedding,
                    content: chunk.content.clone(),
                    source: chunk.source.clone(),
                    heading: chunk.heading.clone(),
                    heading_level: chunk.heading_level,
                    start_line: chunk.start_line,
                    end_line: chunk.end_line,
                }
            })
            .collect())
    }

    /// Pruning is advisory: a failed source listing logs a warning and skips
    /// the pass instead of failing the run.
    async fn prune_missing_sources(
        &self,
        dir_prefixes: &[String],
        seen: &HashSet<String>,
        stats: &mut IndexStats,
    ) {
        if dir_prefixes.is_empty() {
            return;
        }

        let recorded = match self.store.recorded_sources().await {
            Ok(recorded) => recorded,
            Err(err) => {
                log::warn!("Skipping prune; could not list recorded sources: {err}");
                return;
            }
        };

        for source in recorded {
            let under_scanned_root = dir_prefixes.iter().any(|p| source.starts_with(p.as_str()));
            if !under_scanned_root || seen.contains(&source) {
                continue;
            }
            match self.store.delete_by_source(&source).await {
                Ok(()) => {
                    log::info!("Pruned vanished source {source}");
                    stats.pruned_sources += 1;
                }
                Err(err) => {
                    log::warn!("Failed to prune {source}: {err}");
                    stats.add_error(format!("{source}: prune failed: {err}"));
                }
            }
        }
    }

    async fn lock_for(&self, source: &str) -> Arc<TokioMutex<()>> {
        let mut locks = self.path_locks.lock().await;
        locks.entry(source.to_string()).or_default().clone()
    }
}

/// Canonical source key for a path: lossy UTF-8 with forward slashes, so the
/// same file always maps to the same recorded source string.
#[must_use]
pub fn source_key(path: &Path) -> String {
    let mut key = path.to_string_lossy().to_string();
    if key.contains('\\') {
        key = key.replace('\\', "/");
    }
    key
}
