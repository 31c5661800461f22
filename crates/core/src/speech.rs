//! Text-to-speech trait.

use async_trait::async_trait;

use crate::error::SynthesisError;
use crate::message::Audio;

/// A hosted speech synthesis service.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    fn name(&self) -> &str;

    /// Synthesize `text` into encoded audio.
    async fn synthesize(&self, text: &str) -> Result<Audio, SynthesisError>;
}
