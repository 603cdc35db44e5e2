//! Configuration for nearsight-eye

use image::imageops::FilterType;
use nearsight_core::RegionOfInterest;
use serde::{Deserialize, Serialize};

/// Depth map geometry for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthConfig {
    /// Columns per depth map
    pub width: usize,
    /// Rows per depth map
    pub height: usize,
    /// Cells sampled for the minimum distance
    pub roi: RegionOfInterest,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 192,
            roi: RegionOfInterest::default(),
        }
    }
}

impl DepthConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("Depth map dimensions must be non-zero".to_string());
        }

        if self.width > 4096 || self.height > 4096 {
            return Err("Depth map too large (max 4096x4096)".to_string());
        }

        self.roi
            .validate_within(self.width, self.height)
            .map_err(|e| e.to_string())
    }
}

/// Interpolation used when stretching a capture to the model input size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
        }
    }
}

/// Object detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Model input size (width, height); captures are stretched to fill it
    pub input_size: (u32, u32),
    /// Minimum confidence for a "`label` detected" announcement
    pub confidence_threshold: f32,
    /// Announce "confidence threshold not met" for each weaker result
    pub announce_low_confidence: bool,
    /// Spoken before classification starts, if set
    pub capture_prompt: Option<String>,
    /// Resize interpolation
    pub resize_filter: ResizeFilter,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            input_size: (416, 416),
            confidence_threshold: 0.80,
            announce_low_confidence: true,
            capture_prompt: Some("Identifying objects".to_string()),
            resize_filter: ResizeFilter::Triangle,
        }
    }
}

impl DetectionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.input_size.0 == 0 || self.input_size.1 == 0 {
            return Err("Model input size must be non-zero".to_string());
        }

        if self.input_size.0 > 4096 || self.input_size.1 > 4096 {
            return Err("Model input size too large (max 4096x4096)".to_string());
        }

        if !self.confidence_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err("Confidence threshold must be between 0.0 and 1.0".to_string());
        }

        if let Some(ref prompt) = self.capture_prompt {
            if prompt.trim().is_empty() {
                return Err("Capture prompt cannot be blank if provided".to_string());
            }
        }

        Ok(())
    }
}

/// Vision configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub depth: DepthConfig,
    pub detection: DetectionConfig,
}

impl VisionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.depth.validate()?;
        self.detection.validate()
    }
}
