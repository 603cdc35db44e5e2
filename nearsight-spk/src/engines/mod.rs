//! Speech synthesis engines

pub mod espeak;

use crate::config::VoiceSettings;
use crate::error::SpeechError;
use async_trait::async_trait;

pub use espeak::EspeakSynthesizer;

/// Platform text-to-speech resource.
///
/// `synthesize` resolves once the utterance has been spoken (or handed to a
/// platform queue that plays utterances in order).
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &VoiceSettings) -> Result<(), SpeechError>;

    /// Check if engine is available
    fn is_available(&self) -> bool {
        true
    }

    /// Get engine name
    fn name(&self) -> &str;
}
