//! Speech synthesis clients.
//!
//! - `OpenAiSpeech`: OpenAI-compatible `/audio/speech` (JSON in, audio out)
//! - `AzureSpeech`: Azure Speech REST endpoint (SSML in, audio out)

use async_trait::async_trait;
use dualchat_core::error::SynthesisError;
use dualchat_core::message::Audio;
use dualchat_core::speech::TextToSpeech;
use quick_xml::escape::escape;
use tracing::debug;

use crate::http::{self, Endpoint, HttpFailure};

/// MIME type for an audio format name.
pub fn mime_for_format(format: &str) -> &'static str {
    match format.to_ascii_lowercase().as_str() {
        "wav" | "pcm" => "audio/wav",
        "opus" | "ogg" => "audio/ogg",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        _ => "audio/mpeg",
    }
}

fn non_empty(text: &str) -> Result<&str, SynthesisError> {
    let text = text.trim();
    if text.is_empty() {
        Err(SynthesisError::EmptyText)
    } else {
        Ok(text)
    }
}

/// OpenAI-compatible text-to-speech.
pub struct OpenAiSpeech {
    endpoint: Endpoint,
    model: String,
    voice: String,
    format: String,
    client: reqwest::Client,
}

impl OpenAiSpeech {
    pub fn new(
        endpoint: Endpoint,
        model: impl Into<String>,
        voice: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            model: model.into(),
            voice: voice.into(),
            format: format.into(),
            client: http::client(),
        }
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "response_format": self.format,
        })
    }
}

#[async_trait]
impl TextToSpeech for OpenAiSpeech {
    fn name(&self) -> &str {
        "openai"
    }

    async fn synthesize(&self, text: &str) -> Result<Audio, SynthesisError> {
        let text = non_empty(text)?;
        let url = self.endpoint.url(&self.model, "audio/speech");

        debug!(
            model = %self.model,
            voice = %self.voice,
            chars = text.len(),
            "Sending speech request"
        );

        let response = self
            .endpoint
            .authorize(self.client.post(&url))
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(HttpFailure::network)?;
        let response = http::check(response).await?;
        let bytes = response.bytes().await.map_err(HttpFailure::network)?;

        Ok(Audio {
            bytes: bytes.to_vec(),
            mime_type: mime_for_format(&self.format).into(),
        })
    }
}

/// Azure Speech service text-to-speech.
pub struct AzureSpeech {
    url: String,
    key: String,
    voice: String,
    client: reqwest::Client,
}

/// Output format requested from Azure; matches `audio/mpeg`.
const AZURE_OUTPUT_FORMAT: &str = "audio-16khz-128kbitrate-mono-mp3";

impl AzureSpeech {
    /// Build from a region (`uksouth`) or an explicit endpoint url.
    pub fn new(
        region: Option<&str>,
        url: Option<&str>,
        key: impl Into<String>,
        voice: impl Into<String>,
    ) -> Self {
        let url = match (url, region) {
            (Some(u), _) => u.trim_end_matches('/').to_string(),
            (None, Some(r)) => format!("https://{r}.tts.speech.microsoft.com/cognitiveservices/v1"),
            (None, None) => "https://eastus.tts.speech.microsoft.com/cognitiveservices/v1".into(),
        };
        Self {
            url,
            key: key.into(),
            voice: voice.into(),
            client: http::client(),
        }
    }

    fn ssml(&self, text: &str) -> String {
        format!(
            "<speak version='1.0' xml:lang='en-US'><voice name='{}'>{}</voice></speak>",
            escape(&self.voice),
            escape(text)
        )
    }
}

#[async_trait]
impl TextToSpeech for AzureSpeech {
    fn name(&self) -> &str {
        "azure"
    }

    async fn synthesize(&self, text: &str) -> Result<Audio, SynthesisError> {
        let text = non_empty(text)?;

        debug!(voice = %self.voice, chars = text.len(), "Sending Azure speech request");

        let response = self
            .client
            .post(&self.url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", AZURE_OUTPUT_FORMAT)
            .header("User-Agent", "dualchat")
            .body(self.ssml(text))
            .send()
            .await
            .map_err(HttpFailure::network)?;
        let response = http::check(response).await?;
        let bytes = response.bytes().await.map_err(HttpFailure::network)?;

        Ok(Audio {
            bytes: bytes.to_vec(),
            mime_type: "audio/mpeg".into(),
        })
    }
}
