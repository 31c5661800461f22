//! Chat sessions for dualchat.
//!
//! - `render`: pure `history -> Vec<UiNode>` rendering and the `Surface` trait
//! - `session`: `ChatSession`, one agent, its history and its config
//! - `orchestrator`: fans one prompt out to every enabled session, in order

pub mod orchestrator;
pub mod render;
pub mod session;

pub use orchestrator::{Interaction, Orchestrator, SessionSettings, SharedConfig, apply_config};
pub use render::{Panel, Surface, UiNode, render, render_message};
pub use session::{ChatSession, SessionConfig};

#[cfg(test)]
pub(crate) mod test_helpers;
