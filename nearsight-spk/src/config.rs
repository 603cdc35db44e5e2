//! Configuration for spoken announcements

use serde::{Deserialize, Serialize};

/// Voice used for every utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// Speaking rate on a 0.0-1.0 scale, 0.5 being the platform default
    pub rate: f32,

    /// Pitch multiplier (0.5-2.0, 1.0 is neutral)
    pub pitch: f32,

    /// Language code (e.g., "en-US")
    pub language: String,

    /// Specific voice identifier, if any
    pub name: Option<String>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: 0.6,
            pitch: 1.0,
            language: "en-US".to_string(),
            name: None,
        }
    }
}

impl VoiceSettings {
    /// Validate voice settings
    pub fn validate(&self) -> Result<(), String> {
        if !self.rate.is_finite() || !(0.0..=1.0).contains(&self.rate) {
            return Err("Speech rate must be between 0.0 and 1.0".to_string());
        }

        if !self.pitch.is_finite() || !(0.5..=2.0).contains(&self.pitch) {
            return Err("Pitch multiplier must be between 0.5 and 2.0".to_string());
        }

        if self.language.is_empty() {
            return Err("Language code cannot be empty".to_string());
        }

        if self.language.len() > 32 {
            return Err("Language code too long (max 32 chars)".to_string());
        }

        if !self.language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("Language code contains invalid characters (only alphanumeric and '-' allowed)".to_string());
        }

        if let Some(ref name) = self.name {
            if name.is_empty() || name.len() > 256 {
                return Err("Voice name must be 1-256 chars if provided".to_string());
            }

            if name.chars().any(|c| c.is_control()) {
                return Err("Voice name contains invalid characters".to_string());
            }
        }

        Ok(())
    }
}

/// Speech configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub voice: VoiceSettings,

    /// Warn when this many utterances are waiting
    pub backlog_warning: usize,

    /// Longest accepted utterance, in bytes
    pub max_text_len: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: VoiceSettings::default(),
            backlog_warning: 16,
            max_text_len: 1_000,
        }
    }
}

impl SpeechConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.backlog_warning == 0 {
            return Err("Backlog warning threshold must be greater than 0".to_string());
        }

        if self.max_text_len == 0 || self.max_text_len > 100_000 {
            return Err("Max text length must be between 1 and 100000 bytes".to_string());
        }

        self.voice.validate()
    }
}
