//! Knowledge store for dualchat.
//!
//! Provides the vector index behind the RAG agent:
//! - **InMemory**: volatile index, useful for tests
//! - **File**: JSONL-persisted index loaded at startup
//!
//! Plus the ingestion pipeline that chunks source files, embeds the chunks
//! and appends them to a `FileIndex`.

pub mod file_store;
pub mod in_memory;
pub mod ingest;
pub mod vector;

use dualchat_core::knowledge::Document;
use serde::{Deserialize, Serialize};

pub use file_store::FileIndex;
pub use in_memory::InMemoryIndex;
pub use ingest::{IngestReport, Ingestor, SourceChunk};

/// A document stored alongside its embedding.
///
/// Serialized flat, so a JSONL line reads
/// `{"id": .., "content": .., "metadata": {..}, "embedding": [..]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    #[serde(flatten)]
    pub document: Document,
    pub embedding: Vec<f32>,
}

impl IndexedDocument {
    pub fn new(document: Document, embedding: Vec<f32>) -> Self {
        Self {
            document,
            embedding,
        }
    }
}
