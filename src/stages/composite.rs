//! Final compositing: trim, scale, and center onto the delivery canvas
//!
//! Deterministic and stateless: the content bounding box is trimmed,
//! scaled to fit the padded target square while preserving aspect ratio,
//! and centered on a fully transparent canvas.

use crate::error::{RefineError, Result};
use crate::types::ContentBox;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::Serialize;

/// Statistics from a compositing pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompositeStats {
    /// Bounding box trimmed from the input mask
    pub content_box: ContentBox,
    /// Scale factor applied to the trimmed content
    pub scale: f32,
    /// Output canvas dimensions (always `target_size` square)
    pub dimensions: (u32, u32),
}

/// Bounding box of all pixels with alpha above zero.
fn content_bounds(mask: &RgbaImage) -> Option<ContentBox> {
    let (width, height) = mask.dimensions();
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;

    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[3] > 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    any.then(|| ContentBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Trim, scale, and center the mask onto a transparent square canvas.
///
/// `scale = min(max_dim / w, max_dim / h)` with
/// `max_dim = target_size * (1 - 2 * padding)`, so the resized content's
/// larger dimension fits the padded area within a pixel.
///
/// # Errors
/// - `RefineError::InvalidConfig` for `target_size == 0` or padding
///   outside `[0, 0.5)`
/// - `RefineError::Stage` when the mask has no opaque content (an empty
///   delivery canvas would hide an upstream failure)
pub fn compose(mask: &RgbaImage, target_size: u32, padding: f32) -> Result<(RgbaImage, CompositeStats)> {
    if target_size == 0 {
        return Err(RefineError::config_value_error(
            "target_size",
            target_size,
            "positive values",
        ));
    }
    if !(0.0..0.5).contains(&padding) {
        return Err(RefineError::config_value_error("padding", padding, "[0, 0.5)"));
    }

    let content_box = content_bounds(mask).ok_or_else(|| {
        RefineError::stage_error("composite", "mask has no opaque content to composite")
    })?;

    let trimmed = imageops::crop_imm(
        mask,
        content_box.x,
        content_box.y,
        content_box.width,
        content_box.height,
    )
    .to_image();

    let max_dim = f64::from(target_size) * f64::from(1.0 - 2.0 * padding);
    let scale = (max_dim / f64::from(content_box.width))
        .min(max_dim / f64::from(content_box.height));
    let scaled_w = ((f64::from(content_box.width) * scale).round() as u32).max(1);
    let scaled_h = ((f64::from(content_box.height) * scale).round() as u32).max(1);
    let resized = imageops::resize(&trimmed, scaled_w, scaled_h, FilterType::Lanczos3);

    let mut canvas = RgbaImage::new(target_size, target_size);
    let offset_x = i64::from((target_size - scaled_w.min(target_size)) / 2);
    let offset_y = i64::from((target_size - scaled_h.min(target_size)) / 2);
    imageops::overlay(&mut canvas, &resized, offset_x, offset_y);

    tracing::debug!(
        ?content_box,
        scale,
        target_size,
        "composite produced delivery canvas"
    );
    let stats = CompositeStats {
        content_box,
        scale: scale as f32,
        dimensions: (target_size, target_size),
    };
    Ok((canvas, stats))
}
