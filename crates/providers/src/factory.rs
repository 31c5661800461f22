//! Build the hosted-service clients from configuration.

use std::sync::Arc;

use dualchat_config::{AppConfig, SpeechBackend};
use dualchat_core::provider::{ChatModel, Embedder};
use dualchat_core::speech::TextToSpeech;
use tracing::{info, warn};

use crate::http::Endpoint;
use crate::openai_compat::{OpenAiChatModel, OpenAiEmbedder};
use crate::speech::{AzureSpeech, OpenAiSpeech};

/// The outbound services an application instance talks to.
#[derive(Clone)]
pub struct Services {
    pub chat: Arc<dyn ChatModel>,
    pub embedder: Arc<dyn Embedder>,
    /// `None` when the speech backend is disabled
    pub speech: Option<Arc<dyn TextToSpeech>>,
}

fn flavor_name(flavor: dualchat_config::ApiFlavor) -> &'static str {
    match flavor {
        dualchat_config::ApiFlavor::Openai => "openai",
        dualchat_config::ApiFlavor::Azure => "azure",
    }
}

/// Build chat, embedding and speech clients from configuration.
pub fn build_from_config(config: &AppConfig) -> Services {
    let chat_cfg = &config.chat;
    let chat_endpoint = Endpoint::new(
        chat_cfg.flavor,
        chat_cfg.api_url.as_deref(),
        config.key_for(&chat_cfg.api_key),
        &chat_cfg.api_version,
    );
    let chat = OpenAiChatModel::new(flavor_name(chat_cfg.flavor), chat_endpoint, &chat_cfg.model)
        .with_temperature(chat_cfg.temperature)
        .with_max_tokens(chat_cfg.max_tokens);

    let emb_cfg = &config.embedding;
    let emb_endpoint = Endpoint::new(
        emb_cfg.flavor,
        emb_cfg.api_url.as_deref(),
        config.key_for(&emb_cfg.api_key),
        &emb_cfg.api_version,
    );
    let embedder = OpenAiEmbedder::new(flavor_name(emb_cfg.flavor), emb_endpoint, &emb_cfg.model);

    let speech_cfg = &config.speech;
    let speech: Option<Arc<dyn TextToSpeech>> = match speech_cfg.backend {
        SpeechBackend::Openai => {
            let endpoint = Endpoint::new(
                dualchat_config::ApiFlavor::Openai,
                speech_cfg.api_url.as_deref(),
                config.key_for(&speech_cfg.api_key),
                "",
            );
            Some(Arc::new(OpenAiSpeech::new(
                endpoint,
                &speech_cfg.model,
                &speech_cfg.voice,
                &speech_cfg.format,
            )))
        }
        SpeechBackend::Azure => {
            if speech_cfg.api_key.is_none() {
                warn!("Azure speech backend selected but no speech key configured");
            }
            Some(Arc::new(AzureSpeech::new(
                speech_cfg.region.as_deref(),
                speech_cfg.api_url.as_deref(),
                speech_cfg.api_key.clone().unwrap_or_default(),
                &speech_cfg.voice,
            )))
        }
        SpeechBackend::None => None,
    };

    info!(
        chat = %chat_cfg.model,
        embedding = %emb_cfg.model,
        speech = ?speech_cfg.backend,
        "Services configured"
    );

    Services {
        chat: Arc::new(chat),
        embedder: Arc::new(embedder),
        speech,
    }
}
