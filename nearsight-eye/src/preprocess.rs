//! Capture preprocessing for the detection model

use crate::config::ResizeFilter;
use crate::error::VisionError;
use crate::models::{ModelInput, ARGB_CHANNELS};
use image::{imageops, DynamicImage};

/// Stretch `image` to `width` x `height` (no letterboxing) and repack as ARGB32.
///
/// Aspect ratio is not preserved; the model sees the whole frame squeezed
/// into its fixed input size.
pub fn to_model_input(
    image: &DynamicImage,
    width: u32,
    height: u32,
    filter: ResizeFilter,
) -> Result<ModelInput, VisionError> {
    if width == 0 || height == 0 {
        return Err(VisionError::Preprocess(
            "Target dimensions cannot be zero".to_string(),
        ));
    }

    if image.width() == 0 || image.height() == 0 {
        return Err(VisionError::Preprocess("Captured image is empty".to_string()));
    }

    let total_bytes = (width as usize)
        .checked_mul(height as usize)
        .and_then(|p| p.checked_mul(ARGB_CHANNELS))
        .ok_or_else(|| {
            VisionError::Preprocess("Target dimensions too large, would overflow".to_string())
        })?;

    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, width, height, filter.into());

    let mut pixels = Vec::with_capacity(total_bytes);
    for px in resized.pixels() {
        let [r, g, b] = px.0;
        pixels.extend_from_slice(&[u8::MAX, r, g, b]);
    }

    Ok(ModelInput {
        width,
        height,
        pixels,
    })
}
