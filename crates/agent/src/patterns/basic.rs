//! BasicChat pattern: no retrieval, the prompt goes straight to the model.

use std::sync::Arc;

use async_trait::async_trait;
use dualchat_core::agent::{Agent, AgentReply};
use dualchat_core::message::Message;
use dualchat_core::provider::{ChatModel, CompletionRequest};
use tracing::debug;

/// Plain chat agent. Returns the model's text verbatim, without sources.
pub struct BasicChatAgent {
    model: Arc<dyn ChatModel>,
}

impl BasicChatAgent {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Agent for BasicChatAgent {
    fn name(&self) -> &str {
        "basic_chat"
    }

    async fn respond(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        history: &[Message],
    ) -> dualchat_core::Result<AgentReply> {
        let request = CompletionRequest::new(prompt)
            .with_system_prompt(system_prompt)
            .with_history(history);

        let completion = self.model.complete(request).await?;
        debug!(
            model = %completion.model,
            answer_len = completion.text.len(),
            tokens = ?completion.usage.map(|u| u.total_tokens),
            "BasicChat: response generated"
        );
        Ok(AgentReply::text(completion.text))
    }
}
