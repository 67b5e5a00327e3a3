//! Manual mask editing: explicit, deterministic region corrections
//!
//! The escape hatch for when the automated stages are not enough. Every
//! operation takes explicit numeric parameters, nothing is inferred, and each
//! reports how many pixels it changed and how many it refused to
//! paint because their original color matches the background, so a human
//! or agent can audit each edit.

use crate::config::RefineConfig;
use crate::error::{RefineError, Result};
use crate::types::{BackgroundModel, Side};
use image::RgbaImage;
use serde::Serialize;

/// Statistics from an editing operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EditStats {
    /// Pixels whose value changed
    pub pixels_changed: u64,
    /// Pixels a fill skipped because the original color is within the
    /// background color-distance threshold
    pub pixels_skipped_background: u64,
}

/// A rectangular pixel region given by two corners (any order, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    /// First corner x
    pub x1: u32,
    /// First corner y
    pub y1: u32,
    /// Second corner x
    pub x2: u32,
    /// Second corner y
    pub y2: u32,
}

impl Rect {
    /// Normalize to inclusive `(x_min..=x_max, y_min..=y_max)` ranges,
    /// validating against the image bounds.
    fn normalized(
        self,
        width: u32,
        height: u32,
    ) -> Result<(std::ops::RangeInclusive<u32>, std::ops::RangeInclusive<u32>)> {
        let x_max = self.x1.max(self.x2);
        let y_max = self.y1.max(self.y2);
        if x_max >= width || y_max >= height {
            return Err(RefineError::invalid_config(format!(
                "rectangle corner ({x_max},{y_max}) is outside the {width}x{height} image"
            )));
        }
        Ok((
            self.x1.min(self.x2)..=x_max,
            self.y1.min(self.y2)..=y_max,
        ))
    }
}

/// Paint one pixel opaque, respecting the background skip rule.
///
/// Fill color comes from the original image when supplied, else opaque
/// white. When both an original and a background model are available,
/// pixels whose original color sits within `color_distance` of the
/// background are skipped; the editor never paints backdrop as product,
/// even when the requested geometry covers it.
fn fill_pixel(
    mask: &mut RgbaImage,
    original: Option<&RgbaImage>,
    bg: Option<&BackgroundModel>,
    x: u32,
    y: u32,
    config: &RefineConfig,
    stats: &mut EditStats,
) {
    let rgb = match original {
        Some(original) => {
            let p = original.get_pixel(x, y);
            let rgb = [p[0], p[1], p[2]];
            if let Some(bg) = bg {
                if bg.is_background(rgb, config.color_distance) {
                    stats.pixels_skipped_background += 1;
                    return;
                }
            }
            rgb
        }
        None => [255, 255, 255],
    };
    let next = image::Rgba([rgb[0], rgb[1], rgb[2], 255]);
    let pixel = mask.get_pixel_mut(x, y);
    if *pixel != next {
        stats.pixels_changed += 1;
        *pixel = next;
    }
}

fn clear_pixel(mask: &mut RgbaImage, x: u32, y: u32, stats: &mut EditStats) {
    let pixel = mask.get_pixel_mut(x, y);
    if pixel[3] != 0 {
        stats.pixels_changed += 1;
        pixel[3] = 0;
    }
}

/// Place a hard edge at `x` on the given side for every row in `rows`.
///
/// Per row, against the current edge (first/last pixel with alpha above
/// the profile threshold): extending the foreground fills the gap plus
/// `blend_zone` pixels past the old edge, erasing its soft transition;
/// retracting clears the vacated pixels. Rows with no current edge are
/// skipped; there is no reference edge to work from.
///
/// # Errors
/// - `RefineError::InvalidConfig` for an out-of-bounds `x` or row range
/// - `RefineError::DimensionMismatch` when an original is supplied with
///   different dimensions
pub fn set_edge(
    mut mask: RgbaImage,
    original: Option<&RgbaImage>,
    bg: Option<&BackgroundModel>,
    side: Side,
    x: u32,
    rows: std::ops::Range<u32>,
    config: &RefineConfig,
) -> Result<(RgbaImage, EditStats)> {
    let (width, height) = mask.dimensions();
    if x >= width {
        return Err(RefineError::config_value_error(
            "x",
            x,
            format!("0-{}", width - 1).as_str(),
        ));
    }
    if rows.start >= rows.end || rows.end > height {
        return Err(RefineError::invalid_config(format!(
            "row range {}..{} is empty or exceeds image height {height}",
            rows.start, rows.end
        )));
    }
    if let Some(original) = original {
        if original.dimensions() != mask.dimensions() {
            return Err(RefineError::dimension_mismatch(
                mask.dimensions(),
                original.dimensions(),
            ));
        }
    }

    let mut stats = EditStats::default();
    for y in rows {
        let current = match side {
            Side::Left => (0..width).find(|&cx| mask.get_pixel(cx, y)[3] > config.profile_threshold),
            Side::Right => {
                (0..width).rev().find(|&cx| mask.get_pixel(cx, y)[3] > config.profile_threshold)
            }
        };
        let Some(current) = current else { continue };

        match side {
            Side::Left => {
                if x < current {
                    // Extend leftward; the blend zone overwrites the old
                    // soft edge pixels just inside the region.
                    let to = (current + config.blend_zone).min(width - 1);
                    for fx in x..=to {
                        fill_pixel(&mut mask, original, bg, fx, y, config, &mut stats);
                    }
                } else {
                    for cx in current..x {
                        clear_pixel(&mut mask, cx, y, &mut stats);
                    }
                }
            }
            Side::Right => {
                if x > current {
                    let from = current.saturating_sub(config.blend_zone);
                    for fx in from..=x {
                        fill_pixel(&mut mask, original, bg, fx, y, config, &mut stats);
                    }
                } else {
                    for cx in x + 1..=current {
                        clear_pixel(&mut mask, cx, y, &mut stats);
                    }
                }
            }
        }
    }

    tracing::debug!(
        %side,
        x,
        changed = stats.pixels_changed,
        skipped = stats.pixels_skipped_background,
        "edge set"
    );
    Ok((mask, stats))
}

/// Fill a rectangular region opaque, skipping background-like pixels.
///
/// # Errors
/// - `RefineError::InvalidConfig` for a rectangle outside the image
/// - `RefineError::DimensionMismatch` when an original is supplied with
///   different dimensions
pub fn fill_rect(
    mut mask: RgbaImage,
    original: Option<&RgbaImage>,
    bg: Option<&BackgroundModel>,
    rect: Rect,
    config: &RefineConfig,
) -> Result<(RgbaImage, EditStats)> {
    let (width, height) = mask.dimensions();
    if let Some(original) = original {
        if original.dimensions() != mask.dimensions() {
            return Err(RefineError::dimension_mismatch(
                mask.dimensions(),
                original.dimensions(),
            ));
        }
    }
    let (xs, ys) = rect.normalized(width, height)?;

    let mut stats = EditStats::default();
    for y in ys {
        for x in xs.clone() {
            fill_pixel(&mut mask, original, bg, x, y, config, &mut stats);
        }
    }
    tracing::debug!(?rect, changed = stats.pixels_changed, "rect filled");
    Ok((mask, stats))
}

/// Clear a rectangular region to full transparency.
///
/// Clears never consult the background model; removing pixels is always
/// safe.
///
/// # Errors
/// Returns `RefineError::InvalidConfig` for a rectangle outside the image.
pub fn clear_rect(mut mask: RgbaImage, rect: Rect) -> Result<(RgbaImage, EditStats)> {
    let (width, height) = mask.dimensions();
    let (xs, ys) = rect.normalized(width, height)?;

    let mut stats = EditStats::default();
    for y in ys {
        for x in xs.clone() {
            clear_pixel(&mut mask, x, y, &mut stats);
        }
    }
    tracing::debug!(?rect, changed = stats.pixels_changed, "rect cleared");
    Ok((mask, stats))
}
