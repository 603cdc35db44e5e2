//! Classify an image file with a scripted engine and print the announcements
//!
//! Usage: cargo run -p nearsight-eye --example classify_image -- <image> [label confidence]...

use nearsight_core::{Announcer, DetectionResult};
use nearsight_eye::{DetectionConfig, ObjectDetectionPipeline, ScriptedEngine};
use std::sync::Arc;

struct PrintAnnouncer;

impl Announcer for PrintAnnouncer {
    fn announce(&self, text: &str) {
        println!("speak: {}", text);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: classify_image <image> [label confidence]...")?;

    let rest: Vec<String> = args.collect();
    let mut detections = Vec::new();
    for pair in rest.chunks(2) {
        if let [label, confidence] = pair {
            detections.push(DetectionResult::new(label.clone(), confidence.parse::<f32>()?));
        }
    }

    let engine = Arc::new(ScriptedEngine::new());
    engine.push_detections(detections);

    let pipeline = ObjectDetectionPipeline::new(
        DetectionConfig::default(),
        engine,
        Arc::new(PrintAnnouncer),
        tokio::runtime::Handle::current(),
    )?;

    let image = Arc::new(image::open(&path)?);
    let spoken = pipeline.classify_now(image).await;
    println!("{} announcement(s)", spoken.len());
    Ok(())
}
