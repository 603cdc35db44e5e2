//! Vision processing pipelines

pub mod detection;

pub use detection::{announcements_for, CapturedImage, ObjectDetectionPipeline};
