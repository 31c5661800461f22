//! Agent patterns.
//!
//! 1. **BasicChat**: plain passthrough to the chat model
//! 2. **VectorRAG**: embed, retrieve, augment, complete

pub mod basic;
pub mod rag;

pub use basic::BasicChatAgent;
pub use rag::VectorRagAgent;

#[cfg(test)]
pub(crate) mod test_helpers;
