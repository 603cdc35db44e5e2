//! espeak-ng command-line synthesizer

use super::SpeechSynthesizer;
use crate::config::VoiceSettings;
use crate::error::SpeechError;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Words per minute at the platform-default rate of 0.5
const DEFAULT_WPM: f32 = 175.0;

/// Speaks through the `espeak-ng` binary, waiting for each utterance to finish.
pub struct EspeakSynthesizer {
    program: String,
    available: bool,
}

impl EspeakSynthesizer {
    pub fn new() -> Self {
        Self::with_program("espeak-ng")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        let program = program.into();
        let available = std::process::Command::new(&program)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false);

        Self { program, available }
    }

    /// espeak speed in words per minute (80-450).
    pub fn words_per_minute(rate: f32) -> u32 {
        ((rate / 0.5) * DEFAULT_WPM).round().clamp(80.0, 450.0) as u32
    }

    /// espeak pitch (0-99, 50 neutral) from a pitch multiplier.
    pub fn espeak_pitch(pitch: f32) -> u32 {
        (pitch * 50.0).round().clamp(0.0, 99.0) as u32
    }
}

impl Default for EspeakSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for EspeakSynthesizer {
    async fn synthesize(&self, text: &str, voice: &VoiceSettings) -> Result<(), SpeechError> {
        if !self.available {
            return Err(SpeechError::Synthesizer(format!("{} not available", self.program)));
        }

        // text goes as a single argv entry, never through a shell
        let voice_name = voice.name.as_deref().unwrap_or(&voice.language);
        let output = Command::new(&self.program)
            .arg("-v")
            .arg(voice_name)
            .arg("-s")
            .arg(Self::words_per_minute(voice.rate).to_string())
            .arg("-p")
            .arg(Self::espeak_pitch(voice.pitch).to_string())
            .arg("--")
            .arg(text)
            .output()
            .await?;

        if !output.status.success() {
            return Err(SpeechError::Synthesizer(format!(
                "{} failed: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        debug!(chars = text.len(), "utterance spoken");
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &str {
        "espeak-ng"
    }
}
