//! Object detection pipeline

use crate::config::DetectionConfig;
use crate::error::VisionError;
use crate::models::InferenceEngine;
use crate::preprocess::to_model_input;
use image::DynamicImage;
use nearsight_core::{Announcer, DetectionResult};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Frame captured by the camera when the user asks what is ahead
pub type CapturedImage = Arc<DynamicImage>;

/// Spoken when a result falls below the confidence threshold
pub const LOW_CONFIDENCE_ANNOUNCEMENT: &str = "confidence threshold not met";

/// Spoken when the model returns no results
pub const NOTHING_DETECTED_ANNOUNCEMENT: &str = "Nothing detected";

/// Turn model results into announcements, in result order.
pub fn announcements_for(results: &[DetectionResult], config: &DetectionConfig) -> Vec<String> {
    if results.is_empty() {
        return vec![NOTHING_DETECTED_ANNOUNCEMENT.to_string()];
    }

    results
        .iter()
        .filter_map(|result| {
            if result.meets(config.confidence_threshold) {
                info!(
                    label = %result.label,
                    confidence = result.confidence,
                    "object detected"
                );
                Some(format!("{} detected", result.label))
            } else {
                debug!(
                    label = %result.label,
                    confidence = result.confidence,
                    threshold = config.confidence_threshold,
                    "result below confidence threshold"
                );
                config
                    .announce_low_confidence
                    .then(|| LOW_CONFIDENCE_ANNOUNCEMENT.to_string())
            }
        })
        .collect()
}

/// Classifies a captured frame on demand and speaks what it finds.
///
/// Runs on the tokio runtime, never on the frame-delivery path. Requests
/// are not cancelled once started.
#[derive(Clone)]
pub struct ObjectDetectionPipeline {
    config: Arc<DetectionConfig>,
    engine: Arc<dyn InferenceEngine>,
    announcer: Arc<dyn Announcer>,
    runtime: Handle,
}

impl ObjectDetectionPipeline {
    /// Create a new detection pipeline
    pub fn new(
        config: DetectionConfig,
        engine: Arc<dyn InferenceEngine>,
        announcer: Arc<dyn Announcer>,
        runtime: Handle,
    ) -> Result<Self, VisionError> {
        config.validate().map_err(VisionError::Config)?;

        info!(engine = engine.name(), "object detection pipeline ready");

        Ok(Self {
            config: Arc::new(config),
            engine,
            announcer,
            runtime,
        })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Fire-and-forget classification.
    ///
    /// The capture prompt is announced before this returns, so it always
    /// precedes the results. The handle resolves to the announcements made.
    pub fn classify(&self, image: CapturedImage) -> JoinHandle<Vec<String>> {
        self.announce_prompt();
        let pipeline = self.clone();
        self.runtime.spawn(async move { pipeline.run(image).await })
    }

    /// Classify and wait for the announcements.
    pub async fn classify_now(&self, image: CapturedImage) -> Vec<String> {
        self.announce_prompt();
        self.run(image).await
    }

    fn announce_prompt(&self) {
        if let Some(ref prompt) = self.config.capture_prompt {
            self.announcer.announce(prompt);
        }
    }

    async fn run(&self, image: CapturedImage) -> Vec<String> {
        let results = match self.detect(image).await {
            Ok(results) => results,
            Err(e) => {
                error!("Classification failed, nothing announced: {}", e);
                return Vec::new();
            }
        };

        let announcements = announcements_for(&results, &self.config);
        for text in &announcements {
            self.announcer.announce(text);
        }
        announcements
    }

    /// Preprocess off the async workers, then run inference.
    pub async fn detect(&self, image: CapturedImage) -> Result<Vec<DetectionResult>, VisionError> {
        let (width, height) = self.config.input_size;
        let filter = self.config.resize_filter;

        let input = tokio::task::spawn_blocking(move || {
            to_model_input(&image, width, height, filter)
        })
        .await
        .map_err(|e| VisionError::Preprocess(format!("Preprocessing task failed: {}", e)))??;

        debug!(engine = self.engine.name(), "running inference");
        let results = self.engine.detect(&input).await?;
        debug!("Inference returned {} results", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_announcements_high_confidence() {
        let config = DetectionConfig::default();
        let results = vec![DetectionResult::new("chair", 0.95)];
        assert_eq!(announcements_for(&results, &config), vec!["chair detected"]);
    }

    #[test]
    fn test_announcements_threshold_is_inclusive() {
        let config = DetectionConfig::default();
        let results = vec![DetectionResult::new("door", 0.80)];
        assert_eq!(announcements_for(&results, &config), vec!["door detected"]);
    }

    #[test]
    fn test_announcements_low_confidence() {
        let config = DetectionConfig::default();
        let results = vec![
            DetectionResult::new("person", 0.91),
            DetectionResult::new("dog", 0.42),
            DetectionResult::new("cup", f32::NAN),
        ];
        assert_eq!(
            announcements_for(&results, &config),
            vec![
                "person detected",
                LOW_CONFIDENCE_ANNOUNCEMENT,
                LOW_CONFIDENCE_ANNOUNCEMENT
            ]
        );
    }

    #[test]
    fn test_announcements_low_confidence_suppressed() {
        let config = DetectionConfig {
            announce_low_confidence: false,
            ..DetectionConfig::default()
        };
        let results = vec![DetectionResult::new("dog", 0.42)];
        assert!(announcements_for(&results, &config).is_empty());
    }

    #[test]
    fn test_announcements_empty() {
        let config = DetectionConfig::default();
        assert_eq!(
            announcements_for(&[], &config),
            vec![NOTHING_DETECTED_ANNOUNCEMENT]
        );
    }
}
