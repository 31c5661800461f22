//! Hosted model traits: chat completion and text embedding.
//!
//! Implementations: OpenAI-compatible endpoints and Azure OpenAI deployments
//! (see `dualchat-providers`), plus scripted mocks in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CompletionError, EmbeddingError};
use crate::message::Message;

/// A single chat-completion call.
///
/// Model name, temperature and token limits belong to the concrete
/// implementation; the request only carries what varies per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Persona / instructions sent as the system message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Prior turns, oldest first (empty unless the session includes history)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,

    /// The user turn to answer
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: Option<&str>) -> Self {
        self.system_prompt = system_prompt
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_history(mut self, history: &[Message]) -> Self {
        self.history = history.to_vec();
        self
    }
}

/// A complete (non-streaming) response from a chat model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub text: String,

    /// Which model actually responded
    pub model: String,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A hosted chat-completion model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// A human-readable name (e.g., "openai", "azure").
    fn name(&self) -> &str;

    /// Send a request and get a complete response. No retry is attempted.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError>;
}

/// A hosted embedding model.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts, preserving order.
    ///
    /// Default implementation calls `embed()` once per text.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct LengthEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for LengthEmbedder {
        fn name(&self) -> &str {
            "length"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32])
        }
    }

    #[test]
    fn blank_system_prompt_is_dropped() {
        let req = CompletionRequest::new("hi").with_system_prompt(Some("   "));
        assert!(req.system_prompt.is_none());

        let req = CompletionRequest::new("hi").with_system_prompt(Some("Be brief"));
        assert_eq!(req.system_prompt.as_deref(), Some("Be brief"));
    }

    #[tokio::test]
    async fn embed_many_defaults_to_sequential_embed() {
        let embedder = LengthEmbedder {
            calls: AtomicUsize::new(0),
        };
        let vectors = embedder
            .embed_many(&["a".into(), "abc".into()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0], vec![3.0]]);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    }
}
