use crate::error::{IndexerError, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// One discovered markdown file with the metadata available at scan time.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub size: u64,
}

/// Recursive markdown file scanner.
///
/// Skips dot-directories and `node_modules`; yields files sorted by path for
/// deterministic run order.
pub struct FileScanner {
    root: PathBuf,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        if !self.root.exists() {
            return Err(IndexerError::InvalidPath(format!(
                "Path does not exist: {}",
                self.root.display()
            )));
        }
        if self.root.is_file() {
            return if is_markdown(&self.root) {
                let metadata = std::fs::metadata(&self.root)?;
                Ok(vec![ScannedFile {
                    path: self.root.clone(),
                    modified: metadata.modified().ok(),
                    size: metadata.len(),
                }])
            } else {
                Ok(Vec::new())
            };
        }

        let mut files: Vec<ScannedFile> = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            // The root itself is exempt: the caller asked for it, even when
            // its own name is dotted (~/.notes). Skip rules only apply while
            // descending into children.
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {err}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_markdown(entry.path()))
            .map(|entry| {
                let metadata = entry.metadata().ok();
                ScannedFile {
                    path: entry.into_path(),
                    modified: metadata.as_ref().and_then(|m| m.modified().ok()),
                    size: metadata.map_or(0, |m| m.len()),
                }
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        log::debug!(
            "Scanned {} markdown files under {}",
            files.len(),
            self.root.display()
        );
        Ok(files)
    }
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| (name.starts_with('.') && name.len() > 1) || name == "node_modules")
}

pub(crate) fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
