//! Ingestion: turn source files into embedded index entries.
//!
//! - `.md` / `.markdown` files are split with `MarkdownSplitter` (heading aware)
//! - `.jsonl` files hold pre-chunked `{content, metadata}` records
//! - everything else is treated as plain text and split with `TextSplitter`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dualchat_core::error::{Error, Result, RetrievalError};
use dualchat_core::knowledge::Document;
use dualchat_core::provider::Embedder;
use serde::Deserialize;
use text_splitter::{MarkdownSplitter, TextSplitter};
use tracing::{debug, info, warn};

use crate::IndexedDocument;
use crate::file_store::FileIndex;

/// Chunks sent to the embedder per request.
const EMBED_BATCH: usize = 64;

/// A chunk of source text with its metadata, ready to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceChunk {
    pub content: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct JsonlRecord {
    content: String,
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files: usize,
    pub chunks: usize,
}

/// Split text into chunks of at most `chunk_size` characters.
pub fn chunk_text(text: &str, markdown: bool, chunk_size: usize) -> Vec<String> {
    let chunks: Vec<String> = if markdown {
        MarkdownSplitter::new(chunk_size)
            .chunks(text)
            .map(str::to_string)
            .collect()
    } else {
        TextSplitter::new(chunk_size)
            .chunks(text)
            .map(str::to_string)
            .collect()
    };
    chunks.into_iter().filter(|c| !c.trim().is_empty()).collect()
}

fn first_heading(markdown: &str) -> Option<&str> {
    markdown
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn storage(path: &Path, e: impl std::fmt::Display) -> Error {
    Error::Retrieval(RetrievalError::Storage(format!("{}: {e}", path.display())))
}

/// Embeds source files into a `FileIndex`.
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    chunk_size: usize,
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>, chunk_size: usize) -> Self {
        Self {
            embedder,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Read one file into chunks.
    ///
    /// Chunks get `path` metadata, plus `url` when `source_url` is given and
    /// the record does not carry its own.
    pub fn load(&self, path: &Path, source_url: Option<&str>) -> Result<Vec<SourceChunk>> {
        let text = std::fs::read_to_string(path).map_err(|e| storage(path, e))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let mut chunks = match ext.as_str() {
            "jsonl" => self.parse_jsonl(path, &text)?,
            "md" | "markdown" => {
                let title = first_heading(&text).map(str::to_string);
                chunk_text(&text, true, self.chunk_size)
                    .into_iter()
                    .map(|content| {
                        let mut metadata = serde_json::Map::new();
                        if let Some(t) = &title {
                            metadata.insert("title".into(), t.clone().into());
                        }
                        SourceChunk { content, metadata }
                    })
                    .collect()
            }
            _ => chunk_text(&text, false, self.chunk_size)
                .into_iter()
                .map(|content| SourceChunk {
                    content,
                    metadata: serde_json::Map::new(),
                })
                .collect(),
        };

        for chunk in &mut chunks {
            chunk
                .metadata
                .entry("path")
                .or_insert_with(|| path.display().to_string().into());
            if let Some(url) = source_url {
                chunk
                    .metadata
                    .entry("url")
                    .or_insert_with(|| url.to_string().into());
            }
        }

        debug!(path = %path.display(), chunks = chunks.len(), "Source loaded");
        Ok(chunks)
    }

    fn parse_jsonl(&self, path: &Path, text: &str) -> Result<Vec<SourceChunk>> {
        let mut out = Vec::new();
        for (n, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: JsonlRecord = serde_json::from_str(line)
                .map_err(|e| storage(path, format!("line {}: {e}", n + 1)))?;
            if record.content.trim().is_empty() {
                warn!(path = %path.display(), line = n + 1, "Skipping empty record");
                continue;
            }
            out.push(SourceChunk {
                content: record.content,
                metadata: record.metadata,
            });
        }
        Ok(out)
    }

    /// Embed chunks in batches, pairing each with its vector.
    pub async fn embed(&self, chunks: Vec<SourceChunk>) -> Result<Vec<IndexedDocument>> {
        let mut entries = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.embedder.embed_many(&texts).await?;
            for (chunk, embedding) in batch.iter().zip(vectors) {
                let mut document = Document::new("", chunk.content.clone());
                document.metadata = chunk.metadata.clone();
                entries.push(IndexedDocument::new(document, embedding));
            }
        }
        Ok(entries)
    }

    /// Load, embed and append every path to the index.
    ///
    /// Nothing is written unless every file loads and embeds.
    pub async fn ingest(
        &self,
        paths: &[PathBuf],
        source_url: Option<&str>,
        index: &FileIndex,
    ) -> Result<IngestReport> {
        let mut chunks = Vec::new();
        for path in paths {
            chunks.extend(self.load(path, source_url)?);
        }

        let entries = self.embed(chunks).await?;
        let added = index.add(entries).await?;

        let report = IngestReport {
            files: paths.len(),
            chunks: added,
        };
        info!(
            files = report.files,
            chunks = report.chunks,
            embedder = self.embedder.name(),
            "Ingestion complete"
        );
        Ok(report)
    }
}
