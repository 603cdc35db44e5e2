//! Error types for nearsight-sc

use nearsight_core::Error as CoreError;
use thiserror::Error;

/// Audio cue errors
#[derive(Error, Debug)]
pub enum CueError {
    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<CueError> for CoreError {
    fn from(err: CueError) -> Self {
        match err {
            CueError::Config(msg) => CoreError::Configuration(msg),
            CueError::Core(inner) => inner,
            other => CoreError::Component(format!("Audio cue error: {}", other)),
        }
    }
}
