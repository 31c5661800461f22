//! Fan one user prompt out to every enabled session.
//!
//! Sessions are processed strictly in order. The first failure aborts the
//! interaction: the failing session and every later one get no new
//! messages, and earlier sessions keep what they already appended.

use std::collections::HashMap;

use dualchat_core::message::Role;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::render::Panel;
use crate::session::{ChatSession, SessionConfig};

/// Settings broadcast to every session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedConfig {
    pub voice_on: bool,
}

/// Per-session overlay read from the sidebar widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// `None` keeps the current persona; a blank string clears it.
    #[serde(default)]
    pub persona: Option<String>,
}

fn default_true() -> bool {
    true
}

/// One user action: the widget state plus an optional prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default)]
    pub voice_on: bool,

    /// Keyed by session id. Sessions not listed keep their settings.
    #[serde(default)]
    pub sessions: HashMap<String, SessionSettings>,
}

impl Interaction {
    pub fn shared(&self) -> SharedConfig {
        SharedConfig {
            voice_on: self.voice_on,
        }
    }

    /// The prompt, or `None` when it is missing or blank.
    pub fn effective_prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.trim().is_empty())
    }
}

/// Compute a session's config for this interaction.
pub fn apply_config(
    config: &SessionConfig,
    shared: &SharedConfig,
    settings: Option<&SessionSettings>,
) -> SessionConfig {
    let mut next = config.clone();
    next.voice_on = shared.voice_on;
    if let Some(settings) = settings {
        next.enabled = settings.enabled;
        if let Some(persona) = &settings.persona {
            next.system_prompt = Some(persona.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string);
        }
    }
    next
}

/// Owns the sessions of one client and drives them per interaction.
pub struct Orchestrator {
    sessions: Vec<ChatSession>,
}

impl Orchestrator {
    pub fn new(sessions: Vec<ChatSession>) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Render every session's history without changing anything.
    pub fn view(&self) -> Vec<Panel> {
        self.sessions
            .iter()
            .map(|session| {
                let mut panel = Panel::new(session.id(), session.title());
                session.render_history(&mut panel);
                panel
            })
            .collect()
    }

    /// Append the same message to every session, enabled or not.
    pub fn display_in_all(&mut self, role: Role, text: &str) -> Vec<Panel> {
        let mut panels = self.view();
        for (session, panel) in self.sessions.iter_mut().zip(panels.iter_mut()) {
            session.display(role, text, panel);
        }
        panels
    }

    /// Handle one user action.
    ///
    /// Settings are applied to every session before any agent is called.
    /// Each panel is redrawn from history, then each enabled session answers
    /// the prompt in order.
    pub async fn handle(&mut self, interaction: &Interaction) -> dualchat_core::Result<Vec<Panel>> {
        let shared = interaction.shared();
        for session in &mut self.sessions {
            session.config = apply_config(
                &session.config,
                &shared,
                interaction.sessions.get(session.id()),
            );
        }

        let mut panels = self.view();

        let Some(prompt) = interaction.effective_prompt() else {
            return Ok(panels);
        };

        for (session, panel) in self.sessions.iter_mut().zip(panels.iter_mut()) {
            if !session.config.enabled {
                continue;
            }
            let system_prompt = session.config.system_prompt.clone();
            if let Err(e) = session
                .respond_to(prompt, system_prompt.as_deref(), panel)
                .await
            {
                warn!(session = %session.id(), error = %e, "Session failed, aborting interaction");
                return Err(e);
            }
        }

        info!(
            sessions = self.sessions.iter().filter(|s| s.config.enabled).count(),
            voice_on = shared.voice_on,
            "Interaction handled"
        );
        Ok(panels)
    }
}
