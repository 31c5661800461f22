//! In-memory index: useful for testing and as the query engine of `FileIndex`.

use async_trait::async_trait;
use dualchat_core::error::RetrievalError;
use dualchat_core::knowledge::{Document, KnowledgeBase};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::IndexedDocument;
use crate::vector::top_k;

/// An index that keeps embedded documents in a Vec.
#[derive(Clone, Default)]
pub struct InMemoryIndex {
    entries: Arc<RwLock<Vec<IndexedDocument>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<IndexedDocument>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Embedding width of the index, if it holds anything.
    pub async fn dimensions(&self) -> Option<usize> {
        self.entries.read().await.first().map(|e| e.embedding.len())
    }

    /// Append entries, assigning ids to those without one.
    ///
    /// All embeddings must share the index's width.
    pub async fn add(&self, new_entries: Vec<IndexedDocument>) -> Result<usize, RetrievalError> {
        self.add_with(new_entries, |_| Ok(())).await
    }

    /// Like `add`, but `commit` sees the full entry list first. The index is
    /// only updated when `commit` succeeds.
    pub(crate) async fn add_with<F>(
        &self,
        new_entries: Vec<IndexedDocument>,
        commit: F,
    ) -> Result<usize, RetrievalError>
    where
        F: FnOnce(&[IndexedDocument]) -> Result<(), RetrievalError>,
    {
        let mut entries = self.entries.write().await;
        let mut width = entries.first().map(|e| e.embedding.len());

        for entry in &new_entries {
            let len = entry.embedding.len();
            match width {
                Some(expected) if expected != len => {
                    return Err(RetrievalError::DimensionMismatch {
                        expected,
                        actual: len,
                    });
                }
                None => width = Some(len),
                _ => {}
            }
        }

        let added = new_entries.len();
        let mut next = entries.clone();
        next.extend(new_entries.into_iter().map(|mut e| {
            if e.document.id.is_empty() {
                e.document.id = Uuid::new_v4().to_string();
            }
            e
        }));

        commit(&next)?;
        *entries = next;
        Ok(added)
    }
}

#[async_trait]
impl KnowledgeBase for InMemoryIndex {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<Document>, RetrievalError> {
        let entries = self.entries.read().await;
        if let Some(first) = entries.first() {
            if first.embedding.len() != embedding.len() {
                return Err(RetrievalError::DimensionMismatch {
                    expected: first.embedding.len(),
                    actual: embedding.len(),
                });
            }
        }
        Ok(top_k(&entries, embedding, k))
    }

    async fn count(&self) -> Result<usize, RetrievalError> {
        Ok(self.entries.read().await.len())
    }
}
