//! Error types for nearsight-spk

use nearsight_core::Error as CoreError;
use thiserror::Error;

/// Speech errors
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Synthesizer error: {0}")]
    Synthesizer(String),

    #[error("Invalid utterance: {0}")]
    InvalidText(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<SpeechError> for CoreError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Config(msg) => CoreError::Configuration(msg),
            SpeechError::Core(inner) => inner,
            other => CoreError::Component(format!("Speech error: {}", other)),
        }
    }
}
