//! Tests for the object detection pipeline

use image::{DynamicImage, RgbImage};
use nearsight_core::{Announcer, DetectionResult};
use nearsight_eye::{DetectionConfig, ObjectDetectionPipeline, ScriptedEngine};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct RecordingAnnouncer {
    spoken: Mutex<Vec<String>>,
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, text: &str) {
        self.spoken.lock().push(text.to_string());
    }
}

impl RecordingAnnouncer {
    fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

fn capture() -> Arc<DynamicImage> {
    Arc::new(DynamicImage::ImageRgb8(RgbImage::new(1920, 1440)))
}

fn pipeline(
    config: DetectionConfig,
) -> (ObjectDetectionPipeline, Arc<ScriptedEngine>, Arc<RecordingAnnouncer>) {
    let engine = Arc::new(ScriptedEngine::new());
    let announcer = Arc::new(RecordingAnnouncer::default());
    let pipeline = ObjectDetectionPipeline::new(
        config,
        engine.clone(),
        announcer.clone(),
        tokio::runtime::Handle::current(),
    )
    .unwrap();
    (pipeline, engine, announcer)
}

fn silent_config() -> DetectionConfig {
    DetectionConfig {
        capture_prompt: None,
        ..DetectionConfig::default()
    }
}

#[tokio::test]
async fn test_single_confident_object() {
    let (pipeline, engine, announcer) = pipeline(silent_config());
    engine.push_detections(vec![DetectionResult::new("chair", 0.95)]);

    let spoken = pipeline.classify_now(capture()).await;

    assert_eq!(spoken, vec!["chair detected"]);
    assert_eq!(announcer.spoken(), vec!["chair detected"]);
}

#[tokio::test]
async fn test_empty_results_announce_nothing_detected() {
    let (pipeline, engine, announcer) = pipeline(silent_config());
    engine.push_detections(vec![]);

    pipeline.classify_now(capture()).await;

    assert_eq!(announcer.spoken(), vec!["Nothing detected"]);
}

#[tokio::test]
async fn test_model_receives_stretched_input() {
    let (pipeline, engine, _announcer) = pipeline(silent_config());

    pipeline.classify_now(capture()).await;

    assert_eq!(engine.seen_inputs(), vec![(416, 416)]);
}

#[tokio::test]
async fn test_inference_failure_is_silent() {
    let (pipeline, engine, announcer) = pipeline(silent_config());
    engine.push_failure("model not loaded");

    let spoken = pipeline.classify_now(capture()).await;

    assert!(spoken.is_empty());
    assert!(announcer.spoken().is_empty());
}

#[tokio::test]
async fn test_inference_failure_is_not_retried() {
    let (pipeline, engine, _announcer) = pipeline(silent_config());
    engine.push_failure("model not loaded");

    pipeline.classify_now(capture()).await;

    assert_eq!(engine.seen_inputs().len(), 1);
}

#[tokio::test]
async fn test_prompt_precedes_results() {
    let (pipeline, engine, announcer) = pipeline(DetectionConfig::default());
    engine.push_detections(vec![
        DetectionResult::new("person", 0.97),
        DetectionResult::new("bench", 0.3),
    ]);

    let handle = pipeline.classify(capture());
    let spoken = handle.await.unwrap();

    assert_eq!(spoken, vec!["person detected", "confidence threshold not met"]);
    assert_eq!(
        announcer.spoken(),
        vec![
            "Identifying objects",
            "person detected",
            "confidence threshold not met"
        ]
    );
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let engine = Arc::new(ScriptedEngine::new());
    let announcer = Arc::new(RecordingAnnouncer::default());
    let config = DetectionConfig {
        input_size: (0, 416),
        ..DetectionConfig::default()
    };

    let result = ObjectDetectionPipeline::new(
        config,
        engine,
        announcer,
        tokio::runtime::Handle::current(),
    );
    assert!(result.is_err());
}
