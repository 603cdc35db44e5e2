//! Inference engine that replays canned responses

use super::{InferenceEngine, ModelInput};
use crate::error::VisionError;
use async_trait::async_trait;
use nearsight_core::DetectionResult;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Replays queued responses in order, then answers with no detections.
///
/// Drives the replay tool and deterministic tests without a real model.
#[derive(Default)]
pub struct ScriptedEngine {
    responses: Mutex<VecDeque<Result<Vec<DetectionResult>, String>>>,
    inputs: Mutex<Vec<(u32, u32)>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn push_detections(&self, detections: Vec<DetectionResult>) {
        self.responses.lock().push_back(Ok(detections));
    }

    /// Queue a failed inference.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }

    /// Dimensions of every input seen so far.
    pub fn seen_inputs(&self) -> Vec<(u32, u32)> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl InferenceEngine for ScriptedEngine {
    async fn detect(&self, input: &ModelInput) -> Result<Vec<DetectionResult>, VisionError> {
        self.inputs.lock().push((input.width, input.height));
        match self.responses.lock().pop_front() {
            Some(Ok(detections)) => Ok(detections),
            Some(Err(message)) => Err(VisionError::Inference(message)),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
