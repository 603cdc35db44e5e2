//! Inference engine seam and model input format

pub mod scripted;

use crate::error::VisionError;
use async_trait::async_trait;
use nearsight_core::DetectionResult;

pub use scripted::ScriptedEngine;

/// Bytes per ARGB32 pixel
pub const ARGB_CHANNELS: usize = 4;

/// Preprocessed capture in the layout the detection model consumes:
/// row-major 32-bit ARGB, alpha forced opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ModelInput {
    /// ARGB bytes of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * ARGB_CHANNELS;
        self.pixels
            .get(idx..idx + ARGB_CHANNELS)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Object detection model.
///
/// Returns zero or more `(label, confidence)` pairs per call, one per
/// detected instance. Failures surface as `VisionError::Inference`.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    async fn detect(&self, input: &ModelInput) -> Result<Vec<DetectionResult>, VisionError>;

    /// Engine name, for logs
    fn name(&self) -> &str;
}
