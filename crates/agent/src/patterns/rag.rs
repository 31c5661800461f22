//! VectorRAG pattern: Retrieval-Augmented Generation over a vector index.
//!
//! # Flow
//!
//! 1. Embed the user prompt
//! 2. Query the knowledge base for the top-k documents
//! 3. Augment the prompt with the retrieved contents
//! 4. Generate a response, with the persona as system prompt
//! 5. Return the answer together with the retrieved documents

use std::sync::Arc;

use async_trait::async_trait;
use dualchat_core::agent::{Agent, AgentReply};
use dualchat_core::knowledge::KnowledgeBase;
use dualchat_core::message::Message;
use dualchat_core::provider::{ChatModel, CompletionRequest, Embedder};
use tracing::{debug, info};

use crate::prompt::augment;

/// Metadata key used for sources when none is configured.
pub const DEFAULT_SOURCE_KEY: &str = "url";

/// RAG agent. `k` and the source key are fixed at construction.
pub struct VectorRagAgent {
    embedder: Arc<dyn Embedder>,
    knowledge_base: Arc<dyn KnowledgeBase>,
    model: Arc<dyn ChatModel>,
    k: usize,
    source_key: String,
}

impl VectorRagAgent {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        knowledge_base: Arc<dyn KnowledgeBase>,
        model: Arc<dyn ChatModel>,
        k: usize,
    ) -> Self {
        Self {
            embedder,
            knowledge_base,
            model,
            k,
            source_key: DEFAULT_SOURCE_KEY.to_string(),
        }
    }

    /// Metadata key whose value is quoted as each document's source.
    pub fn with_source_key(mut self, source_key: impl Into<String>) -> Self {
        self.source_key = source_key.into();
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn source_key(&self) -> &str {
        &self.source_key
    }
}

#[async_trait]
impl Agent for VectorRagAgent {
    fn name(&self) -> &str {
        "vector_rag"
    }

    async fn respond(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        history: &[Message],
    ) -> dualchat_core::Result<AgentReply> {
        let embedding = self.embedder.embed(prompt).await?;

        let documents = self.knowledge_base.query(&embedding, self.k).await?;
        debug!(
            k = self.k,
            retrieved = documents.len(),
            knowledge_base = self.knowledge_base.name(),
            "RAG: documents retrieved"
        );

        let request = CompletionRequest::new(augment(prompt, &documents, &self.source_key))
            .with_system_prompt(system_prompt)
            .with_history(history);

        let completion = self.model.complete(request).await?;

        info!(
            sources = documents.len(),
            answer_len = completion.text.len(),
            tokens = ?completion.usage.map(|u| u.total_tokens),
            "RAG: response generated"
        );

        Ok(AgentReply::grounded(completion.text, documents))
    }
}
