//! A chat session: one agent, its append-only history and its settings.

use std::sync::Arc;

use dualchat_core::agent::Agent;
use dualchat_core::knowledge::citations_for;
use dualchat_core::message::{Message, Role};
use dualchat_core::speech::TextToSpeech;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::render::{Surface, render, render_message};

/// Metadata key used for citations when a session does not set one.
const DEFAULT_SOURCE_KEY: &str = "url";

/// Per-session settings, overwritten by the orchestrator each interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Disabled sessions are skipped entirely
    pub enabled: bool,

    /// Synthesize each answer to speech
    pub voice_on: bool,

    /// Persona sent as system prompt
    pub system_prompt: Option<String>,

    /// Document metadata key holding the citation url
    pub source_key: Option<String>,

    /// Forward prior turns to the agent
    pub include_history: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            voice_on: false,
            system_prompt: None,
            source_key: None,
            include_history: false,
        }
    }
}

pub struct ChatSession {
    id: String,
    title: String,
    history: Vec<Message>,
    agent: Arc<dyn Agent>,
    speech: Option<Arc<dyn TextToSpeech>>,
    pub config: SessionConfig,
}

impl ChatSession {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        agent: Arc<dyn Agent>,
        config: SessionConfig,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            history: Vec::new(),
            agent,
            speech: None,
            config,
        }
    }

    pub fn with_speech(mut self, speech: Option<Arc<dyn TextToSpeech>>) -> Self {
        self.speech = speech;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Append a plain message and draw it.
    pub fn display(&mut self, role: Role, text: &str, surface: &mut dyn Surface) {
        let message = Message::with_role(role, text);
        for node in render_message(&message) {
            surface.append(node);
        }
        self.history.push(message);
    }

    /// Ask the agent, then append the user turn and the answer.
    ///
    /// Speech is synthesized before anything is appended, so a failure at any
    /// step leaves the history as it was.
    pub async fn respond_to(
        &mut self,
        prompt: &str,
        system_prompt: Option<&str>,
        surface: &mut dyn Surface,
    ) -> dualchat_core::Result<()> {
        let context: &[Message] = if self.config.include_history {
            &self.history
        } else {
            &[]
        };

        let reply = self.agent.respond(prompt, system_prompt, context).await?;

        let source_key = self.config.source_key.as_deref().unwrap_or(DEFAULT_SOURCE_KEY);
        let citations = reply
            .sources
            .as_deref()
            .map(|docs| citations_for(docs, source_key))
            .unwrap_or_default();

        let audio = match (self.config.voice_on, &self.speech) {
            // nothing to voice
            (true, _) if reply.answer.trim().is_empty() => None,
            (true, Some(speech)) => Some(speech.synthesize(&reply.answer).await?),
            (true, None) => {
                warn!(session = %self.id, "Voice is on but no speech backend is configured");
                None
            }
            (false, _) => None,
        };

        let mut answer = Message::assistant(reply.answer).with_citations(citations);
        if let Some(audio) = audio {
            answer = answer.with_audio(audio);
        }

        let question = Message::user(prompt);
        for node in render_message(&question).into_iter().chain(render_message(&answer)) {
            surface.append(node);
        }

        debug!(
            session = %self.id,
            agent = self.agent.name(),
            citations = answer.citations.len(),
            voiced = answer.audio.is_some(),
            "Session answered"
        );

        self.history.push(question);
        self.history.push(answer);
        Ok(())
    }

    /// Redraw the whole history into a cleared surface.
    pub fn render_history(&self, surface: &mut dyn Surface) {
        surface.reset(&self.title);
        for node in render(&self.history) {
            surface.append(node);
        }
    }
}
