//! Symmetry mirroring: reflect a trusted edge onto a damaged one
//!
//! A common AI failure mode leaves one side of a symmetric product clean
//! and the other jagged. Given the product's center axis, this stage
//! measures the clean side's edge distance per row and rewrites the
//! damaged side to match. The mirror is authoritative for the target
//! side: anything beyond the mirrored edge is cleared.

use crate::error::{RefineError, Result};
use crate::types::Side;
use image::RgbaImage;
use serde::Serialize;

/// Statistics from a mirroring pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MirrorStats {
    /// Rows where a source edge was found and mirrored
    pub rows_mirrored: u64,
    /// Rows skipped because the source side had no active pixel
    pub rows_skipped: u64,
    /// Pixels filled opaque on the target side
    pub pixels_filled: u64,
    /// Previously opaque pixels cleared beyond the mirrored edge
    pub pixels_cleared: u64,
}

/// Reflect the source side's edge onto the opposite side about `center`.
///
/// For each row in `rows` (default: full height) the source side is
/// scanned from the image border toward `center` for the first pixel
/// with alpha above `activation`; its distance from the center is then
/// reproduced on the target side: pixels between the center and the
/// mirrored edge become opaque (original RGB when supplied), and any
/// opaque pixel beyond the mirrored edge is cleared. Rows without a
/// source edge are skipped.
///
/// After this stage every processed row satisfies
/// `|target_edge - center| == |source_edge - center|` within one pixel.
///
/// # Errors
/// - `RefineError::InvalidConfig` when `center` is outside the image or
///   the row range is empty or out of bounds
/// - `RefineError::DimensionMismatch` when an original is supplied with
///   different dimensions
pub fn mirror(
    mut mask: RgbaImage,
    original: Option<&RgbaImage>,
    center: u32,
    source: Side,
    rows: Option<std::ops::Range<u32>>,
    activation: u8,
) -> Result<(RgbaImage, MirrorStats)> {
    let (width, height) = mask.dimensions();
    if center >= width {
        return Err(RefineError::config_value_error(
            "center",
            center,
            format!("0-{}", width - 1).as_str(),
        ));
    }
    let rows = rows.unwrap_or(0..height);
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

    let mut stats = MirrorStats {
        rows_mirrored: 0,
        rows_skipped: 0,
        pixels_filled: 0,
        pixels_cleared: 0,
    };

    for y in rows {
        // Scan from the source border inward to the center axis.
        let source_edge = match source {
            Side::Right => (center..width)
                .rev()
                .find(|&x| mask.get_pixel(x, y)[3] > activation),
            Side::Left => (0..=center).find(|&x| mask.get_pixel(x, y)[3] > activation),
        };
        let Some(source_edge) = source_edge else {
            stats.rows_skipped += 1;
            continue;
        };

        let distance = source_edge.abs_diff(center);
        // Mirrored coordinate, clamped to the image so the edge invariant
        // (x in [0, width)) holds even for distances past the border.
        let target_edge = match source {
            Side::Right => center.saturating_sub(distance),
            Side::Left => (center + distance).min(width - 1),
        };
        let (fill_from, fill_to, clear) = match source {
            Side::Right => (target_edge, center, 0..target_edge),
            Side::Left => (center, target_edge, target_edge + 1..width),
        };

        for x in fill_from..=fill_to {
            let rgb = original.map_or_else(
                || {
                    let p = mask.get_pixel(x, y);
                    [p[0], p[1], p[2]]
                },
                |o| {
                    let p = o.get_pixel(x, y);
                    [p[0], p[1], p[2]]
                },
            );
            let next = image::Rgba([rgb[0], rgb[1], rgb[2], 255]);
            let pixel = mask.get_pixel_mut(x, y);
            if *pixel != next {
                stats.pixels_filled += 1;
                *pixel = next;
            }
        }
        for x in clear {
            let pixel = mask.get_pixel_mut(x, y);
            if pixel[3] != 0 {
                stats.pixels_cleared += 1;
                pixel[3] = 0;
            }
        }
        stats.rows_mirrored += 1;
    }

    tracing::debug!(
        center,
        %source,
        rows_mirrored = stats.rows_mirrored,
        filled = stats.pixels_filled,
        cleared = stats.pixels_cleared,
        "mirror applied"
    );
    Ok((mask, stats))
}
