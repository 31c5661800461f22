//! Agent trait: turn a user prompt into an answer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::knowledge::Document;
use crate::message::Message;

/// The result of one `respond` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    /// The generated answer
    pub answer: String,

    /// Documents the answer was grounded on (`None` for agents without retrieval)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Document>>,
}

impl AgentReply {
    pub fn text(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: None,
        }
    }

    pub fn grounded(answer: impl Into<String>, sources: Vec<Document>) -> Self {
        Self {
            answer: answer.into(),
            sources: Some(sources),
        }
    }
}

/// Polymorphic answering capability.
///
/// Implementations: `BasicChatAgent` (plain passthrough) and
/// `VectorRagAgent` (embed, retrieve, augment, complete).
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    /// Answer `prompt`, optionally under a system persona.
    ///
    /// `history` holds prior turns of the calling session; it is empty when
    /// the session does not forward history.
    async fn respond(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        history: &[Message],
    ) -> Result<AgentReply>;
}
