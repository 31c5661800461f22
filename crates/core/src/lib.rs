//! # dualchat core
//!
//! Domain types, collaborator traits, and error definitions for the
//! side-by-side chat front-end. This crate has **zero framework dependencies**:
//! it defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every outbound service (chat completion, embedding, vector store, speech
//! synthesis) is a trait here. Implementations live in their respective
//! crates, which keeps agents and sessions testable with in-process mocks.

pub mod agent;
pub mod error;
pub mod knowledge;
pub mod message;
pub mod provider;
pub mod speech;

// Re-export key types at crate root for ergonomics
pub use agent::{Agent, AgentReply};
pub use error::{CompletionError, EmbeddingError, Error, Result, RetrievalError, SynthesisError};
pub use knowledge::{Document, KnowledgeBase};
pub use message::{Audio, Citation, Message, Role};
pub use provider::{ChatModel, Completion, CompletionRequest, Embedder, Usage};
pub use speech::TextToSpeech;
