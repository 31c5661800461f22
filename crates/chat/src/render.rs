//! UI rendering: stored history to an ordered list of display nodes.
//!
//! Rendering is a pure function of the history. Replaying the same history
//! always yields the same nodes, so a panel can be rebuilt from scratch on
//! every interaction.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use dualchat_core::message::{Message, Role};
use serde::{Deserialize, Serialize};

/// One display element of a chat panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UiNode {
    /// A chat bubble with markdown text
    Text { role: Role, text: String },
    /// A source link under an answer
    Link { label: String, url: String },
    /// An embedded audio player (base64 payload)
    Audio { mime_type: String, data: String },
}

/// Render a single message: its text, then one link per citation, then audio.
pub fn render_message(message: &Message) -> Vec<UiNode> {
    let mut nodes = Vec::with_capacity(1 + message.citations.len());
    nodes.push(UiNode::Text {
        role: message.role,
        text: message.content.clone(),
    });
    nodes.extend(message.citations.iter().map(|c| UiNode::Link {
        label: c.label.clone(),
        url: c.url.clone(),
    }));
    if let Some(audio) = &message.audio {
        nodes.push(UiNode::Audio {
            mime_type: audio.mime_type.clone(),
            data: BASE64_STANDARD.encode(&audio.bytes),
        });
    }
    nodes
}

/// Render a whole history, oldest first.
pub fn render(history: &[Message]) -> Vec<UiNode> {
    history.iter().flat_map(render_message).collect()
}

/// Something a session can draw into.
pub trait Surface: Send {
    /// Clear all content and set the heading.
    fn reset(&mut self, title: &str);

    /// Append one node after the existing content.
    fn append(&mut self, node: UiNode);
}

/// The concrete surface: one titled column in the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub id: String,
    pub title: String,
    pub nodes: Vec<UiNode>,
}

impl Panel {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            nodes: Vec::new(),
        }
    }
}

impl Surface for Panel {
    fn reset(&mut self, title: &str) {
        self.title = title.to_string();
        self.nodes.clear();
    }

    fn append(&mut self, node: UiNode) {
        self.nodes.push(node);
    }
}
