//! Data model shared by every nearsight component

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Borrowed view over a row-major grid of depth samples in meters.
///
/// The frame source owns the storage for the duration of its callback;
/// a `DepthBuffer` never outlives that call.
#[derive(Debug, Clone, Copy)]
pub struct DepthBuffer<'a> {
    data: &'a [f32],
    width: usize,
    height: usize,
}

impl<'a> DepthBuffer<'a> {
    /// Wrap `data` as a `width` x `height` grid.
    pub fn new(data: &'a [f32], width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Configuration(
                "Depth buffer dimensions must be non-zero".to_string(),
            ));
        }

        let expected = width.checked_mul(height).ok_or_else(|| {
            Error::Configuration("Depth buffer dimensions would overflow".to_string())
        })?;

        if data.len() != expected {
            return Err(Error::Configuration(format!(
                "Depth buffer holds {} samples, expected {}x{} = {}",
                data.len(),
                width,
                height,
                expected
            )));
        }

        Ok(Self { data, width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples of one row. `row` must be below `height`.
    pub fn row(&self, row: usize) -> &'a [f32] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }
}

/// Owned depth frame, used when frames cross a channel boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFrame {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
    /// Arrival order assigned by the frame source.
    pub ordinal: u64,
}

impl DepthFrame {
    pub fn new(data: Vec<f32>, width: usize, height: usize, ordinal: u64) -> Self {
        Self { data, width, height, ordinal }
    }

    /// Frame with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: f32, ordinal: u64) -> Self {
        Self::new(vec![value; width * height], width, height, ordinal)
    }

    /// Overwrite every cell covered by `roi` with `value`. Cells outside the
    /// frame, or beyond the end of a short `data`, are skipped.
    pub fn fill_region(&mut self, roi: &RegionOfInterest, value: f32) {
        for row in roi.row_start..=roi.row_end.min(self.height.saturating_sub(1)) {
            for col in roi.col_start..=roi.col_end.min(self.width.saturating_sub(1)) {
                if let Some(cell) = self.data.get_mut(row * self.width + col) {
                    *cell = value;
                }
            }
        }
    }

    pub fn as_buffer(&self) -> Result<DepthBuffer<'_>> {
        DepthBuffer::new(&self.data, self.width, self.height)
    }
}

/// Fixed rectangle of grid cells, bounds inclusive on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl RegionOfInterest {
    pub fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        Self { row_start, row_end, col_start, col_end }
    }

    /// Check the region against a `width` x `height` grid.
    pub fn validate_within(&self, width: usize, height: usize) -> Result<()> {
        if self.row_start > self.row_end || self.col_start > self.col_end {
            return Err(Error::Configuration(format!(
                "Region of interest is inverted: rows {}..={}, cols {}..={}",
                self.row_start, self.row_end, self.col_start, self.col_end
            )));
        }

        if self.row_end >= height || self.col_end >= width {
            return Err(Error::Configuration(format!(
                "Region of interest rows {}..={}, cols {}..={} exceeds {}x{} buffer",
                self.row_start, self.row_end, self.col_start, self.col_end, width, height
            )));
        }

        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        (self.row_end.saturating_sub(self.row_start) + 1)
            * (self.col_end.saturating_sub(self.col_start) + 1)
    }
}

impl Default for RegionOfInterest {
    /// Forward path of a 256x192 scene-depth map.
    fn default() -> Self {
        Self::new(71, 121, 103, 178)
    }
}

/// One sampled distance, ordered by arrival.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityReading {
    pub distance_meters: f32,
    pub timestamp_ordinal: u64,
}

impl ProximityReading {
    pub fn new(distance_meters: f32, timestamp_ordinal: u64) -> Self {
        Self { distance_meters, timestamp_ordinal }
    }
}

/// Alert level derived from the closest obstacle in the forward path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlertState {
    #[default]
    Clear,
    Approaching,
    /// Obstacle within the warning threshold; the repeating cue plays.
    Imminent,
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertState::Clear => "clear",
            AlertState::Approaching => "approaching",
            AlertState::Imminent => "imminent",
        };
        f.write_str(name)
    }
}

/// Edge-triggered notifications emitted by the proximity state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProximityEvent {
    /// Entered `Imminent`; speak the one-shot warning.
    EnteredApproaching,
    /// Left `Imminent`; stop the repeating cue.
    ExitedImminent,
}

/// Repeat state of the audio cue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CueSchedule {
    pub interval_seconds: f32,
    pub is_active: bool,
}

impl Default for CueSchedule {
    fn default() -> Self {
        Self {
            interval_seconds: 5.0,
            is_active: false,
        }
    }
}

/// One labelled detection from the inference engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub label: String,
    pub confidence: f32,
}

impl DetectionResult {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// True when the confidence is a real number at or above `threshold`.
    pub fn meets(&self, threshold: f32) -> bool {
        self.confidence.is_finite() && self.confidence >= threshold
    }
}
