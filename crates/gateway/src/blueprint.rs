//! Session blueprint: agents built once at startup, stamped into a fresh
//! `Orchestrator` for every new client.

use std::sync::Arc;

use dualchat_agent::{BasicChatAgent, VectorRagAgent};
use dualchat_chat::{ChatSession, Orchestrator, SessionConfig};
use dualchat_config::{AgentKind, AppConfig, SessionProfile};
use dualchat_core::agent::Agent;
use dualchat_core::knowledge::KnowledgeBase;
use dualchat_core::speech::TextToSpeech;
use dualchat_providers::Services;
use serde::Serialize;
use tracing::debug;

/// One panel as the browser sees it before any interaction.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDescriptor {
    pub id: String,
    pub title: String,
    pub enabled: bool,
    /// Default persona; `None` means the panel has no persona text area
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
}

/// Initial widget state for the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub voice_on: bool,
    pub sessions: Vec<SessionDescriptor>,
}

pub struct Blueprint {
    sessions: Vec<(SessionProfile, Arc<dyn Agent>)>,
    speech: Option<Arc<dyn TextToSpeech>>,
    voice_on: bool,
    include_history: bool,
}

impl Blueprint {
    pub fn new(
        sessions: Vec<(SessionProfile, Arc<dyn Agent>)>,
        speech: Option<Arc<dyn TextToSpeech>>,
    ) -> Self {
        Self {
            sessions,
            speech,
            voice_on: false,
            include_history: false,
        }
    }

    /// Bind every configured session to its agent.
    pub fn from_config(
        config: &AppConfig,
        services: &Services,
        knowledge_base: Arc<dyn KnowledgeBase>,
    ) -> Self {
        let sessions = config
            .sessions
            .iter()
            .map(|profile| {
                let agent: Arc<dyn Agent> = match profile.agent {
                    AgentKind::Basic => Arc::new(BasicChatAgent::new(services.chat.clone())),
                    AgentKind::VectorRag => {
                        let mut agent = VectorRagAgent::new(
                            services.embedder.clone(),
                            knowledge_base.clone(),
                            services.chat.clone(),
                            config.knowledge_base.k,
                        );
                        if let Some(key) = &profile.source_key {
                            agent = agent.with_source_key(key.clone());
                        }
                        debug!(
                            session = %profile.id,
                            k = agent.k(),
                            source_key = agent.source_key(),
                            "Retrieval configured"
                        );
                        Arc::new(agent)
                    }
                };
                debug!(session = %profile.id, agent = agent.name(), "Session bound");
                (profile.clone(), agent)
            })
            .collect();

        Self::new(sessions, services.speech.clone())
            .with_defaults(config.ui.voice_on, config.ui.include_history)
    }

    /// Set the voice and history defaults every new client starts with.
    pub fn with_defaults(mut self, voice_on: bool, include_history: bool) -> Self {
        self.voice_on = voice_on;
        self.include_history = include_history;
        self
    }

    /// A fresh orchestrator with empty histories.
    pub fn orchestrator(&self) -> Orchestrator {
        let sessions = self
            .sessions
            .iter()
            .map(|(profile, agent)| {
                let config = SessionConfig {
                    enabled: profile.enabled,
                    voice_on: self.voice_on,
                    system_prompt: profile.persona.clone(),
                    source_key: profile.source_key.clone(),
                    include_history: self.include_history,
                };
                ChatSession::new(&profile.id, &profile.title, agent.clone(), config)
                    .with_speech(self.speech.clone())
            })
            .collect();
        Orchestrator::new(sessions)
    }

    pub fn layout(&self) -> Layout {
        Layout {
            voice_on: self.voice_on,
            sessions: self
                .sessions
                .iter()
                .map(|(profile, _)| SessionDescriptor {
                    id: profile.id.clone(),
                    title: profile.title.clone(),
                    enabled: profile.enabled,
                    persona: profile.persona.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualchat_knowledge::InMemoryIndex;

    fn blueprint() -> Blueprint {
        let config = AppConfig::default();
        let services = dualchat_providers::build_from_config(&config);
        Blueprint::from_config(&config, &services, Arc::new(InMemoryIndex::new()))
    }

    #[test]
    fn default_config_yields_two_panels() {
        let layout = blueprint().layout();
        let ids: Vec<&str> = layout.sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["gpt", "rag"]);
        assert!(layout.sessions[0].persona.is_none());
        assert!(layout.sessions[1].persona.is_some());
        assert!(!layout.voice_on);
    }

    #[test]
    fn orchestrators_start_empty_and_independent() {
        let bp = blueprint();
        let a = bp.orchestrator();
        let b = bp.orchestrator();
        assert_eq!(a.sessions().len(), 2);
        assert!(a.sessions().iter().all(|s| s.history().is_empty()));
        assert_eq!(a.view(), b.view());
    }

    #[test]
    fn profile_settings_seed_session_config() {
        let orchestrator = blueprint().with_defaults(true, true).orchestrator();
        let rag = &orchestrator.sessions()[1];
        assert!(rag.config.voice_on);
        assert!(rag.config.include_history);
        assert_eq!(rag.config.source_key.as_deref(), Some("url"));
        assert!(rag.config.system_prompt.as_deref().unwrap().contains("British Airways"));
    }
}
