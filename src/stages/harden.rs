//! Edge hardening: eliminate the semi-transparent fringe at boundaries
//!
//! AI models leave a soft "glow" of intermediate alpha along product
//! edges. This stage finds where the product actually starts in each row
//! by comparing the *original* image's luminosity against the background
//! model, then forces everything before that point transparent and
//! everything after it opaque. Because the scan reads only the immutable
//! original, re-running the stage on its own output changes nothing.

use crate::config::RefineConfig;
use crate::error::{RefineError, Result};
use crate::types::{luminosity, BackgroundModel};
use image::RgbaImage;
use serde::Serialize;

/// Which edges a hardening pass rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HardenMode {
    /// Scan left-to-right only: pixels before the product start are
    /// cleared, pixels from it onward are forced opaque.
    LeftEdge,
    /// Scan from both sides: pixels outside the product span are
    /// cleared, pixels inside it are forced opaque.
    Symmetric,
}

impl std::fmt::Display for HardenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LeftEdge => write!(f, "left-edge"),
            Self::Symmetric => write!(f, "symmetric"),
        }
    }
}

/// Statistics from a hardening pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HardenStats {
    /// Pixels forced fully opaque that were not already
    pub pixels_hardened: u64,
    /// Pixels forced fully transparent that were not already
    pub pixels_cleared: u64,
    /// Rows left untouched because no product pixel was found
    pub rows_skipped: u64,
    /// Background luminosity the bands were measured against
    pub bg_luminosity: f32,
}

/// Whether an original-image pixel reads as product against the
/// background: darker than the dark band allows, or lighter than the
/// light threshold allows. Both asymmetric bands are always checked.
fn is_product(lum: f32, bg: &BackgroundModel, config: &RefineConfig) -> bool {
    lum < bg.luminosity - config.dark_band || lum > bg.luminosity + config.luminosity_threshold
}

/// Harden every row of the mask against the original image.
///
/// Rows where no pixel clears either luminosity band are left unchanged
/// (the product may simply not reach that row). Misclassification of
/// textured backgrounds or bright highlights is not an error; the pixel
/// counts in the returned stats exist so a human or agent can judge the
/// result and reach for the manual editor if needed.
///
/// # Errors
/// Returns `RefineError::DimensionMismatch` when the original's
/// dimensions differ from the mask's (checked before any mutation).
pub fn harden(
    mut mask: RgbaImage,
    original: &RgbaImage,
    bg: &BackgroundModel,
    mode: HardenMode,
    config: &RefineConfig,
) -> Result<(RgbaImage, HardenStats)> {
    if original.dimensions() != mask.dimensions() {
        return Err(RefineError::dimension_mismatch(
            mask.dimensions(),
            original.dimensions(),
        ));
    }

    let (width, height) = mask.dimensions();
    let mut stats = HardenStats {
        pixels_hardened: 0,
        pixels_cleared: 0,
        rows_skipped: 0,
        bg_luminosity: bg.luminosity,
    };

    for y in 0..height {
        let product_start =
            (0..width).find(|&x| is_product(luminosity(original.get_pixel(x, y)), bg, config));
        let Some(start) = product_start else {
            stats.rows_skipped += 1;
            continue;
        };
        let end = match mode {
            HardenMode::LeftEdge => width - 1,
            // The left scan found a product pixel, so the reverse scan
            // always finds one too.
            HardenMode::Symmetric => (start..width)
                .rev()
                .find(|&x| is_product(luminosity(original.get_pixel(x, y)), bg, config))
                .unwrap_or(start),
        };

        for x in 0..width {
            let pixel = mask.get_pixel_mut(x, y);
            if (start..=end).contains(&x) {
                let source = original.get_pixel(x, y);
                let next = image::Rgba([source[0], source[1], source[2], 255]);
                if *pixel != next {
                    stats.pixels_hardened += 1;
                    *pixel = next;
                }
            } else if pixel[3] != 0 {
                stats.pixels_cleared += 1;
                pixel[3] = 0;
            }
        }
    }

    tracing::debug!(
        %mode,
        hardened = stats.pixels_hardened,
        cleared = stats.pixels_cleared,
        skipped_rows = stats.rows_skipped,
        "edge hardening applied"
    );
    Ok((mask, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Original with uniform light background and a dark product band per
    /// row starting at `product_start`.
    fn packshot(width: u32, height: u32, bg_value: u8, product_start: u32, product_end: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if (product_start..=product_end).contains(&x) {
                Rgba([40, 40, 40, 255])
            } else {
                Rgba([bg_value, bg_value, bg_value, 255])
            }
        })
    }

    fn bg_model(value: f32) -> BackgroundModel {
        BackgroundModel {
            mean: [value, value, value],
            luminosity: value,
        }
    }

    /// Fuzzy mask: semi-transparent fringe everywhere.
    fn fuzzy_mask(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| Rgba([90, 90, 90, (x % 254) as u8]))
    }

    #[test]
    fn test_left_edge_scan_hardens_whole_row() {
        // bg lum 230, threshold 15, first product pixel at x=120 (lum 40):
        // all x<120 -> alpha 0, all x>=120 -> alpha 255 with original RGB.
        let original = packshot(300, 4, 230, 120, 299);
        let mask = fuzzy_mask(300, 4);
        let config = RefineConfig::default();
        let (out, _) = harden(mask, &original, &bg_model(230.0), HardenMode::LeftEdge, &config)
            .unwrap();
        for y in 0..4 {
            for x in 0..120 {
                assert_eq!(out.get_pixel(x, y)[3], 0, "({x},{y})");
            }
            for x in 120..300 {
                let p = out.get_pixel(x, y);
                assert_eq!(p[3], 255, "({x},{y})");
                assert_eq!(&p.0[..3], &original.get_pixel(x, y).0[..3]);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let original = packshot(200, 10, 230, 60, 150);
        let config = RefineConfig::default();
        let bg = bg_model(230.0);
        let (once, _) =
            harden(fuzzy_mask(200, 10), &original, &bg, HardenMode::Symmetric, &config).unwrap();
        let (twice, stats) = harden(once.clone(), &original, &bg, HardenMode::Symmetric, &config)
            .unwrap();
        assert_eq!(once, twice);
        assert_eq!(stats.pixels_hardened, 0);
        assert_eq!(stats.pixels_cleared, 0);
    }

    #[test]
    fn test_symmetric_clears_both_sides() {
        let original = packshot(200, 2, 230, 60, 150);
        let config = RefineConfig::default();
        let (out, _) = harden(
            fuzzy_mask(200, 2),
            &original,
            &bg_model(230.0),
            HardenMode::Symmetric,
            &config,
        )
        .unwrap();
        for x in 0..60 {
            assert_eq!(out.get_pixel(x, 0)[3], 0);
        }
        for x in 60..=150 {
            assert_eq!(out.get_pixel(x, 0)[3], 255);
        }
        for x in 151..200 {
            assert_eq!(out.get_pixel(x, 0)[3], 0);
        }
    }

    #[test]
    fn test_left_edge_mode_keeps_right_of_start_opaque() {
        let original = packshot(200, 1, 230, 60, 150);
        let config = RefineConfig::default();
        let (out, _) = harden(
            fuzzy_mask(200, 1),
            &original,
            &bg_model(230.0),
            HardenMode::LeftEdge,
            &config,
        )
        .unwrap();
        // Left-edge mode hardens everything from the first product pixel
        // to the right border, background included.
        assert_eq!(out.get_pixel(180, 0)[3], 255);
        assert_eq!(out.get_pixel(30, 0)[3], 0);
    }

    #[test]
    fn test_light_product_band_detected() {
        // White product (lum 255) on a mid-gray background (lum 200):
        // caught by the light band, not the dark one.
        let original = RgbaImage::from_fn(100, 1, |x, _| {
            if x >= 40 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([200, 200, 200, 255])
            }
        });
        let config = RefineConfig::default();
        let (out, _) = harden(
            RgbaImage::new(100, 1),
            &original,
            &bg_model(200.0),
            HardenMode::LeftEdge,
            &config,
        )
        .unwrap();
        assert_eq!(out.get_pixel(39, 0)[3], 0);
        assert_eq!(out.get_pixel(40, 0)[3], 255);
    }

    #[test]
    fn test_rows_without_product_are_untouched() {
        // Pure background original: no row has a product pixel.
        let original = RgbaImage::from_pixel(50, 5, Rgba([230, 230, 230, 255]));
        let mask = fuzzy_mask(50, 5);
        let config = RefineConfig::default();
        let (out, stats) = harden(
            mask.clone(),
            &original,
            &bg_model(230.0),
            HardenMode::LeftEdge,
            &config,
        )
        .unwrap();
        assert_eq!(stats.rows_skipped, 5);
        assert_eq!(out, mask);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let original = RgbaImage::new(10, 11);
        let config = RefineConfig::default();
        let result = harden(
            RgbaImage::new(10, 10),
            &original,
            &bg_model(230.0),
            HardenMode::LeftEdge,
            &config,
        );
        assert!(matches!(
            result,
            Err(RefineError::DimensionMismatch { .. })
        ));
    }
}
