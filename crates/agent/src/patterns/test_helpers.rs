//! Shared test helpers for agent tests.
//!
//! Every mock records into a shared `CallLog`, so tests can assert both
//! how often each collaborator was called and in which order.

use async_trait::async_trait;
use dualchat_core::error::{CompletionError, EmbeddingError, RetrievalError};
use dualchat_core::knowledge::{Document, KnowledgeBase};
use dualchat_core::provider::{ChatModel, Completion, CompletionRequest, Embedder, Usage};
use std::sync::{Arc, Mutex};

/// Ordered record of collaborator calls, e.g. `["embed", "query:5", "complete"]`.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

/// A chat model that answers with a fixed text and keeps every request.
pub struct MockChatModel {
    answer: String,
    log: CallLog,
    requests: Mutex<Vec<CompletionRequest>>,
    fail: bool,
}

impl MockChatModel {
    pub fn new(answer: &str, log: CallLog) -> Self {
        Self {
            answer: answer.to_string(),
            log,
            requests: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing(log: CallLog) -> Self {
        Self {
            fail: true,
            ..Self::new("", log)
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        "mock_chat"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        self.log.push("complete");
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(CompletionError::ApiError {
                status_code: 500,
                message: "upstream exploded".into(),
            });
        }
        Ok(Completion {
            text: self.answer.clone(),
            model: "mock-model".into(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
        })
    }
}

/// An embedder returning a constant vector.
pub struct MockEmbedder {
    log: CallLog,
    fail: bool,
}

impl MockEmbedder {
    pub fn new(log: CallLog) -> Self {
        Self { log, fail: false }
    }

    pub fn failing(log: CallLog) -> Self {
        Self { log, fail: true }
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn name(&self) -> &str {
        "mock_embedder"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.log.push("embed");
        if self.fail {
            return Err(EmbeddingError::Network("connection refused".into()));
        }
        Ok(vec![0.1, 0.2, 0.3])
    }
}

/// A knowledge base returning fixed documents (truncated to k).
pub struct MockKnowledgeBase {
    documents: Vec<Document>,
    log: CallLog,
    fail: bool,
}

impl MockKnowledgeBase {
    pub fn new(documents: Vec<Document>, log: CallLog) -> Self {
        Self {
            documents,
            log,
            fail: false,
        }
    }

    pub fn failing(log: CallLog) -> Self {
        Self {
            documents: Vec::new(),
            log,
            fail: true,
        }
    }
}

#[async_trait]
impl KnowledgeBase for MockKnowledgeBase {
    fn name(&self) -> &str {
        "mock_kb"
    }

    async fn query(&self, _embedding: &[f32], k: usize) -> Result<Vec<Document>, RetrievalError> {
        self.log.push(format!("query:{k}"));
        if self.fail {
            return Err(RetrievalError::Unavailable("index offline".into()));
        }
        Ok(self.documents.iter().take(k).cloned().collect())
    }

    async fn count(&self) -> Result<usize, RetrievalError> {
        Ok(self.documents.len())
    }
}

/// Three baggage documents that all mention 23kg.
pub fn baggage_documents() -> Vec<Document> {
    vec![
        Document::new("d1", "Economy passengers may check one bag of up to 23kg.")
            .with_meta("url", "https://www.britishairways.com/baggage/checked")
            .with_meta("title", "Checked baggage"),
        Document::new("d2", "Business passengers may check two bags of up to 23kg each.")
            .with_meta("url", "https://www.britishairways.com/baggage/checked"),
        Document::new("d3", "Cabin bags must not exceed 23kg.")
            .with_meta("url", "https://www.britishairways.com/baggage/cabin"),
    ]
}
