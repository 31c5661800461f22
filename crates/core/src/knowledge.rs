//! Knowledge base trait: nearest-neighbour lookup over embedded documents.
//!
//! The on-disk layout of an index belongs to the implementation; this
//! module only fixes the query contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;
use crate::message::Citation;

/// A retrieved document chunk. Read-only once produced by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique ID within the index
    pub id: String,

    /// The chunk text
    pub content: String,

    /// Arbitrary metadata (url, title, file path, ...)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Similarity to the query (set by search operations)
    #[serde(default)]
    pub score: f32,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: serde_json::Map::new(),
            score: 0.0,
        }
    }

    /// Attach a string metadata value.
    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata
            .insert(key.to_string(), serde_json::Value::String(value.into()));
        self
    }

    /// Look up a string-valued metadata entry.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// Build a citation from the metadata entry named by `source_key`.
    ///
    /// The label is the `title` metadata when present, else the url itself.
    pub fn citation(&self, source_key: &str) -> Option<Citation> {
        let url = self.meta_str(source_key)?.trim();
        if url.is_empty() {
            return None;
        }
        let label = self
            .meta_str("title")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(url);
        Some(Citation {
            label: label.to_string(),
            url: url.to_string(),
        })
    }
}

/// Build de-duplicated citations (first occurrence wins) for a set of documents.
pub fn citations_for(documents: &[Document], source_key: &str) -> Vec<Citation> {
    let mut out: Vec<Citation> = Vec::new();
    for citation in documents.iter().filter_map(|d| d.citation(source_key)) {
        if !out.iter().any(|c| c.url == citation.url) {
            out.push(citation);
        }
    }
    out
}

/// The core KnowledgeBase trait.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// The backend name (e.g., "file", "memory").
    fn name(&self) -> &str;

    /// Return at most `k` documents ordered by descending similarity.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<Document>, RetrievalError>;

    /// Number of indexed documents.
    async fn count(&self) -> Result<usize, RetrievalError>;
}
