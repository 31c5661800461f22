//! Hosted service clients for dualchat.
//!
//! Chat and embedding clients implement `dualchat_core::ChatModel` and
//! `dualchat_core::Embedder`; speech clients implement `TextToSpeech`.
//! `build_from_config` wires them up from the application config.

pub mod factory;
pub mod http;
pub mod openai_compat;
pub mod speech;

pub use factory::{Services, build_from_config};
pub use http::Endpoint;
pub use openai_compat::{OpenAiChatModel, OpenAiEmbedder};
pub use speech::{AzureSpeech, OpenAiSpeech};
