//! nearsight-eye: depth sampling and object detection
//!
//! Two vision paths feed the alert engine:
//! - per-frame minimum-distance sampling over a fixed region of the depth map
//! - on-demand classification of a captured frame, spoken through an announcer

pub mod config;
pub mod depth;
pub mod error;
pub mod models;
pub mod preprocess;
pub mod processing;

pub use config::{DepthConfig, DetectionConfig, ResizeFilter, VisionConfig};
pub use depth::{sample, DepthFrameSampler};
pub use error::VisionError;
pub use models::{InferenceEngine, ModelInput, ScriptedEngine};
pub use processing::{CapturedImage, ObjectDetectionPipeline};
