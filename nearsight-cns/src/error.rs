//! Error types for nearsight-cns

use nearsight_core::Error as CoreError;
use nearsight_eye::VisionError;
use nearsight_sc::CueError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CnsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vision error: {0}")]
    Vision(#[from] VisionError),

    #[error("Cue error: {0}")]
    Cue(#[from] CueError),

    #[error("Frame loop error: {0}")]
    FrameLoop(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<CnsError> for CoreError {
    fn from(err: CnsError) -> Self {
        match err {
            CnsError::Config(msg) => CoreError::Configuration(msg),
            CnsError::Vision(inner) => inner.into(),
            CnsError::Cue(inner) => inner.into(),
            CnsError::Core(inner) => inner,
            other => CoreError::Component(other.to_string()),
        }
    }
}
