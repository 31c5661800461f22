//! File-based vector index: persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `IndexedDocument`. The whole file is loaded
//! when the index is opened and rewritten on every `add`.
//!
//! Default location: `data/ba-chunks/index.jsonl` (see `KnowledgeBaseConfig`).

use async_trait::async_trait;
use dualchat_core::error::RetrievalError;
use dualchat_core::knowledge::{Document, KnowledgeBase};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::IndexedDocument;
use crate::in_memory::InMemoryIndex;

/// A vector index persisted as JSONL.
pub struct FileIndex {
    path: PathBuf,
    index: InMemoryIndex,
}

impl FileIndex {
    /// Open the index at `path`.
    ///
    /// A missing file gives an empty index (created on first `add`).
    /// Corrupt lines are skipped with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load_from_disk(&path);
        info!(path = %path.display(), count = entries.len(), "Vector index loaded");
        Self {
            path,
            index: InMemoryIndex::with_entries(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Vec<IndexedDocument> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No index file, starting empty");
                return Vec::new();
            }
        };

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(n, line)| match serde_json::from_str::<IndexedDocument>(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(line = n + 1, error = %e, "Skipping corrupted index entry");
                    None
                }
            })
            .collect()
    }

    /// Embedding width of the stored entries, if any.
    pub async fn dimensions(&self) -> Option<usize> {
        self.index.dimensions().await
    }

    fn write_to_disk(path: &Path, entries: &[IndexedDocument]) -> Result<(), RetrievalError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RetrievalError::Storage(format!("Failed to create index directory: {e}"))
                })?;
            }
        }

        let mut content = String::new();
        for entry in entries {
            let line = serde_json::to_string(entry).map_err(|e| {
                RetrievalError::Storage(format!("Failed to serialize index entry: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(path, &content)
            .map_err(|e| RetrievalError::Storage(format!("Failed to write index file: {e}")))?;

        debug!(path = %path.display(), count = entries.len(), "Index flushed");
        Ok(())
    }

    /// Append embedded documents and persist the index.
    ///
    /// Memory is only updated once the new file is written.
    pub async fn add(&self, entries: Vec<IndexedDocument>) -> Result<usize, RetrievalError> {
        self.index
            .add_with(entries, |all| Self::write_to_disk(&self.path, all))
            .await
    }
}

#[async_trait]
impl KnowledgeBase for FileIndex {
    fn name(&self) -> &str {
        "file"
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<Document>, RetrievalError> {
        self.index.query(embedding, k).await
    }

    async fn count(&self) -> Result<usize, RetrievalError> {
        self.index.count().await
    }
}
