//! Minimum-distance sampling over a fixed region of a depth map
//!
//! The minimum is the safety-relevant quantity: it is the closest point of
//! the nearest obstacle in the forward path, which an average would hide.

use crate::config::DepthConfig;
use nearsight_core::{DepthBuffer, Error, RegionOfInterest, Result};
use tracing::trace;

/// Round to the nearest 0.01 m, the comparison granularity of the state machine.
pub fn round_to_centimeters(meters: f32) -> f32 {
    (meters * 100.0).round() / 100.0
}

/// Minimum finite sample inside `roi`, rounded to 0.01.
///
/// Non-finite cells are sensor "no return" markers and are skipped. When the
/// region holds no finite cell at all the result is `NaN`, which downstream
/// treats as a malformed reading.
pub fn sample(buffer: &DepthBuffer<'_>, roi: &RegionOfInterest) -> Result<f32> {
    roi.validate_within(buffer.width(), buffer.height())?;

    let min = (roi.row_start..=roi.row_end)
        .flat_map(|row| buffer.row(row)[roi.col_start..=roi.col_end].iter().copied())
        .filter(|d| d.is_finite())
        .fold(None, |acc: Option<f32>, d| Some(acc.map_or(d, |m| m.min(d))));

    Ok(min.map_or(f32::NAN, round_to_centimeters))
}

/// Sampler bound to one session's depth geometry.
#[derive(Debug, Clone)]
pub struct DepthFrameSampler {
    roi: RegionOfInterest,
    width: usize,
    height: usize,
}

impl DepthFrameSampler {
    /// Fails fast when the region does not fit the session's depth map.
    pub fn new(roi: RegionOfInterest, width: usize, height: usize) -> Result<Self> {
        roi.validate_within(width, height)?;
        Ok(Self { roi, width, height })
    }

    pub fn from_config(config: &DepthConfig) -> Result<Self> {
        config.validate().map_err(Error::Configuration)?;
        Self::new(config.roi, config.width, config.height)
    }

    pub fn roi(&self) -> &RegionOfInterest {
        &self.roi
    }

    /// Sample a frame; its dimensions must match the session geometry.
    pub fn sample_frame(&self, buffer: &DepthBuffer<'_>) -> Result<f32> {
        if buffer.width() != self.width || buffer.height() != self.height {
            return Err(Error::Configuration(format!(
                "Depth map is {}x{}, session expects {}x{}",
                buffer.width(),
                buffer.height(),
                self.width,
                self.height
            )));
        }

        let distance = sample(buffer, &self.roi)?;
        trace!(distance, "sampled depth frame");
        Ok(distance)
    }
}
