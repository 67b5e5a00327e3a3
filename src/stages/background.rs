//! Background color sampling from image corners
//!
//! Product shots are photographed against a near-uniform backdrop, so the
//! corner blocks of the *original* (non-cutout) image are a reliable
//! sample of the background color. The resulting model is computed once
//! per image and shared by every stage that needs it.

use crate::config::{Corner, RefineConfig};
use crate::types::{luminosity, BackgroundModel};
use image::RgbaImage;

/// Estimate the background color and luminosity from fixed corner blocks
/// of the original image.
///
/// Pure function: deterministic for a fixed image and config, no side
/// effects. Blocks are clamped to the image bounds, so images smaller
/// than the configured block size still sample every corner pixel once
/// per configured corner.
#[must_use]
pub fn sample_background(original: &RgbaImage, config: &RefineConfig) -> BackgroundModel {
    let (width, height) = original.dimensions();
    let block = config.corner_block.min(width).min(height);

    let mut sum = [0.0f64; 3];
    let mut lum_sum = 0.0f64;
    let mut count = 0u64;

    for corner in &config.corners {
        let (x0, y0) = match corner {
            Corner::TopLeft => (0, 0),
            Corner::TopRight => (width - block, 0),
            Corner::BottomLeft => (0, height - block),
            Corner::BottomRight => (width - block, height - block),
        };
        for y in y0..y0 + block {
            for x in x0..x0 + block {
                let pixel = original.get_pixel(x, y);
                sum[0] += f64::from(pixel[0]);
                sum[1] += f64::from(pixel[1]);
                sum[2] += f64::from(pixel[2]);
                lum_sum += f64::from(luminosity(pixel));
                count += 1;
            }
        }
    }

    let n = count.max(1) as f64;
    BackgroundModel {
        mean: [
            (sum[0] / n) as f32,
            (sum[1] / n) as f32,
            (sum[2] / n) as f32,
        ],
        luminosity: (lum_sum / n) as f32,
    }
}
