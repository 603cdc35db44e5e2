//! Recorded session traces
//!
//! One JSON object per line:
//!
//! ```text
//! {"distance": 0.85}
//! {"distance": null}
//! {"capture": [{"label": "chair", "confidence": 0.95}]}
//! ```
//!
//! `null` stands for a frame whose region held no depth return. Blank lines
//! and lines starting with `#` are skipped.

use anyhow::{bail, Context, Result};
use nearsight_core::{DepthFrame, DetectionResult};
use nearsight_eye::DepthConfig;
use serde_json::Value;
use std::io::BufRead;

/// Depth outside the region of interest in synthesized frames (meters)
pub const BACKGROUND_DEPTH: f32 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    Distance { distance: Option<f32> },
    Capture { capture: Vec<DetectionResult> },
}

impl TraceEvent {
    fn from_json(value: Value) -> Result<Self> {
        let Value::Object(mut fields) = value else {
            bail!("expected a JSON object");
        };
        if fields.len() != 1 {
            bail!("expected exactly one of \"distance\" or \"capture\"");
        }

        if let Some(distance) = fields.remove("distance") {
            return Ok(TraceEvent::Distance {
                distance: serde_json::from_value(distance)?,
            });
        }
        if let Some(capture) = fields.remove("capture") {
            return Ok(TraceEvent::Capture {
                capture: serde_json::from_value(capture)?,
            });
        }
        bail!("unknown event kind")
    }
}

/// Parse a whole trace, reporting the first bad line by number.
pub fn parse<R: BufRead>(reader: R) -> Result<Vec<TraceEvent>> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading trace line {}", index + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event = serde_json::from_str(line)
            .map_err(anyhow::Error::from)
            .and_then(TraceEvent::from_json)
            .with_context(|| format!("trace line {} is not a distance or capture", index + 1))?;
        events.push(event);
    }
    Ok(events)
}

/// Depth frame whose region of interest reads `distance` everywhere.
pub fn synthetic_frame(distance: Option<f32>, ordinal: u64, depth: &DepthConfig) -> DepthFrame {
    let mut frame = DepthFrame::filled(depth.width, depth.height, BACKGROUND_DEPTH, ordinal);
    frame.fill_region(&depth.roi, distance.unwrap_or(f32::NAN));
    frame
}
