use crate::indexer::Indexer;
use crate::Result;
use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;

/// What happened to a watched file. Duplicate deliveries for the same change
/// are expected from the backend; handling is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Created,
    Modified,
    Deleted,
}

impl WatchEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }
}

/// Called after each flushed change with the event kind, a one-line summary
/// of what the indexer did, and the affected path.
pub type WatchObserver = Arc<dyn Fn(WatchEventKind, &str, &Path) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub debounce: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1500),
        }
    }
}

enum WatcherCommand {
    Shutdown,
}

/// Handle to a running watch loop; dropping it shuts the loop down.
pub struct WatchHandle {
    command_tx: mpsc::Sender<WatcherCommand>,
    _watcher: Option<RecommendedWatcher>,
}

impl WatchHandle {
    pub async fn stop(&self) {
        let _ = self.command_tx.send(WatcherCommand::Shutdown).await;
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        let _ = self.command_tx.try_send(WatcherCommand::Shutdown);
    }
}

/// Watch the given roots recursively and feed debounced markdown changes to
/// the indexer.
///
/// If the notify backend cannot be initialized the watcher degrades to a
/// no-op with a warning; the handle still works and `stop()` still returns.
pub fn start_watcher(
    indexer: Arc<Indexer>,
    roots: Vec<PathBuf>,
    config: WatcherConfig,
    observer: Option<WatchObserver>,
) -> Result<WatchHandle> {
    let (event_tx, event_rx) = mpsc::channel(1024);
    let (command_tx, command_rx) = mpsc::channel(16);

    let watcher = match create_fs_watcher(&roots, event_tx) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            log::warn!("File watching unavailable ({err}); changes will not be picked up");
            None
        }
    };

    spawn_watch_loop(indexer, config, event_rx, command_rx, observer);

    Ok(WatchHandle {
        command_tx,
        _watcher: watcher,
    })
}

fn create_fs_watcher(
    roots: &[PathBuf],
    sender: mpsc::Sender<notify::Result<Event>>,
) -> notify::Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = sender.blocking_send(res);
        },
        NotifyConfig::default(),
    )?;
    for root in roots {
        watcher.watch(root, RecursiveMode::Recursive)?;
    }
    Ok(watcher)
}

fn spawn_watch_loop(
    indexer: Arc<Indexer>,
    config: WatcherConfig,
    mut event_rx: mpsc::Receiver<notify::Result<Event>>,
    mut command_rx: mpsc::Receiver<WatcherCommand>,
    observer: Option<WatchObserver>,
) {
    tokio::spawn(async move {
        let mut pending = PendingChanges::new(config.debounce);

        loop {
            let next_deadline = pending.next_deadline();

            tokio::select! {
                Some(event) = event_rx.recv() => {
                    handle_event(event, &mut pending);
                }
                Some(cmd) = command_rx.recv() => {
                    match cmd {
                        WatcherCommand::Shutdown => break,
                    }
                }
                () = async {
                    if let Some(deadline) = next_deadline {
                        time::sleep_until(deadline).await;
                    }
                }, if next_deadline.is_some() => {
                    for (path, kind) in pending.take_due(time::Instant::now()) {
                        flush_change(&indexer, &path, kind, observer.as_ref()).await;
                    }
                }
            }
        }
        log::debug!("Watch loop stopped");
    });
}

fn handle_event(event: notify::Result<Event>, pending: &mut PendingChanges) {
    let event = match event {
        Ok(event) => event,
        Err(err) => {
            log::warn!("Watcher error: {err}");
            return;
        }
    };
    let Some(kind) = map_event_kind(&event.kind) else {
        return;
    };
    for path in event.paths {
        if crate::scanner::is_markdown(&path) {
            pending.record(path, kind);
        }
    }
}

fn map_event_kind(kind: &EventKind) -> Option<WatchEventKind> {
    match kind {
        EventKind::Create(_) => Some(WatchEventKind::Created),
        EventKind::Remove(_) => Some(WatchEventKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(WatchEventKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(WatchEventKind::Created),
        EventKind::Modify(_) => Some(WatchEventKind::Modified),
        _ => None,
    }
}

/// Each stabilized change maps to exactly one indexer call. The filesystem
/// is re-checked at flush time: a path that no longer exists is a deletion
/// no matter what the last event said, which makes replayed events harmless.
async fn flush_change(
    indexer: &Indexer,
    path: &Path,
    kind: WatchEventKind,
    observer: Option<&WatchObserver>,
) {
    let (kind, summary) = if path.exists() {
        match indexer.index_file(path, false).await {
            Ok(0) => (kind, "up to date".to_string()),
            Ok(stored) => (kind, format!("{stored} chunks stored")),
            Err(err) => {
                log::warn!("Failed to index {}: {err}", path.display());
                (kind, format!("index failed: {err}"))
            }
        }
    } else {
        match indexer.delete_source(path).await {
            Ok(()) => (WatchEventKind::Deleted, "source removed".to_string()),
            Err(err) => {
                log::warn!("Failed to delete {}: {err}", path.display());
                (WatchEventKind::Deleted, format!("delete failed: {err}"))
            }
        }
    };

    log::info!("{} {}: {summary}", kind.as_str(), path.display());
    if let Some(observer) = observer {
        observer(kind, &summary, path);
    }
}

/// Debounce buffer keyed by path. Re-recording a path replaces its kind and
/// pushes its deadline out, so a burst of saves flushes once.
struct PendingChanges {
    debounce: Duration,
    changes: HashMap<PathBuf, (WatchEventKind, time::Instant)>,
}

impl PendingChanges {
    fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            changes: HashMap::new(),
        }
    }

    fn record(&mut self, path: PathBuf, kind: WatchEventKind) {
        let due = time::Instant::now() + self.debounce;
        self.changes.insert(path, (kind, due));
    }

    fn next_deadline(&self) -> Option<time::Instant> {
        self.changes.values().map(|(_, due)| *due).min()
    }

    fn take_due(&mut self, now: time::Instant) -> Vec<(PathBuf, WatchEventKind)> {
        let due: Vec<PathBuf> = self
            .changes
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(path, _)| path.clone())
            .collect();
        due.into_iter()
            .filter_map(|path| {
                self.changes
                    .remove(&path)
                    .map(|(kind, _)| (path, kind))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn duplicate_events_coalesce_into_one_change() {
        let mut pending = PendingChanges::new(Duration::from_millis(100));
        let path = PathBuf::from("notes.md");
        pending.record(path.clone(), WatchEventKind::Created);
        pending.record(path, WatchEventKind::Modified);
        assert_eq!(pending.changes.len(), 1);
    }

    #[test]
    fn latest_kind_wins() {
        let mut pending = PendingChanges::new(Duration::from_millis(100));
        let path = PathBuf::from("notes.md");
        pending.record(path.clone(), WatchEventKind::Modified);
        pending.record(path.clone(), WatchEventKind::Deleted);
        assert_eq!(pending.changes[&path].0, WatchEventKind::Deleted);
    }

    #[test]
    fn nothing_is_due_before_the_debounce_window() {
        let mut pending = PendingChanges::new(Duration::from_secs(60));
        pending.record(PathBuf::from("notes.md"), WatchEventKind::Modified);
        assert!(pending.take_due(time::Instant::now()).is_empty());
        assert!(pending.next_deadline().is_some());
    }

    #[test]
    fn due_changes_are_drained() {
        let mut pending = PendingChanges::new(Duration::from_millis(0));
        pending.record(PathBuf::from("a.md"), WatchEventKind::Modified);
        pending.record(PathBuf::from("b.md"), WatchEventKind::Deleted);
        let far_future = time::Instant::now() + Duration::from_secs(1);
        let mut flushed = pending.take_due(far_future);
        flushed.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(flushed.len(), 2);
        assert!(pending.changes.is_empty());
        assert!(pending.next_deadline().is_none());
    }

    #[test]
    fn rename_events_map_to_delete_and_create() {
        use notify::event::{ModifyKind, RenameMode};
        assert_eq!(
            map_event_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::From))),
            Some(WatchEventKind::Deleted)
        );
        assert_eq!(
            map_event_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::To))),
            Some(WatchEventKind::Created)
        );
        assert_eq!(map_event_kind(&EventKind::Access(notify::event::AccessKind::Any)), None);
    }
}
