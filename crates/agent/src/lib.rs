//! Answering agents for dualchat.
//!
//! Both agents implement `dualchat_core::Agent`:
//!
//! 1. **BasicChat**: forwards the prompt (and persona) to the chat model
//! 2. **VectorRAG**: embeds the prompt, retrieves the top-k documents,
//!    augments the prompt with them and forwards it to the chat model
//!
//! Neither agent caches or retries; each `respond` is one pass over its
//! collaborators.

pub mod patterns;
pub mod prompt;

pub use patterns::{BasicChatAgent, VectorRagAgent};
pub use prompt::augment;
