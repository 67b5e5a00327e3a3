//! Alpha thresholding: probabilistic alpha to a decisive foreground mask
//!
//! The AI collaborator emits confidence values across the whole 0-255
//! range. Downstream geometry stages need a decisive mask, so everything
//! below the computed threshold drops to exactly 0. Two output modes are
//! kept because downstream consumers disagree: the diagnostic viewer
//! wants the cutout's own colors preserved (soft), the final compositor
//! wants hard alpha with colors re-sourced from the original (binary).

use crate::error::{RefineError, Result};
use image::RgbaImage;
use serde::Serialize;

/// Output mode for [`apply_threshold`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    /// Below-threshold alpha becomes 0; surviving pixels keep the
    /// cutout's alpha and colors untouched.
    Soft,
    /// Below-threshold alpha becomes 0; surviving pixels become fully
    /// opaque with RGB replaced from the original image (required,
    /// dimension-checked).
    Binary,
}

impl std::fmt::Display for ThresholdMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Soft => write!(f, "soft"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// Statistics from a thresholding pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdStats {
    /// The alpha cut-off actually applied (derived from aggressiveness)
    pub threshold_value: u8,
    /// Pixels whose alpha was forced to 0
    pub pixels_zeroed: u64,
    /// Pixels forced fully opaque (binary mode only; 0 in soft mode)
    pub pixels_forced: u64,
}

/// Map an aggressiveness dial position to the alpha cut-off value.
///
/// `threshold = clamp(aggressiveness/100 * 0.9 + 0.05, 0.05, 0.95)`,
/// scaled to the 0-255 alpha range. Higher aggressiveness keeps fewer
/// pixels.
///
/// # Errors
/// Returns `RefineError::InvalidConfig` when `aggressiveness` is outside
/// 1-100.
pub fn threshold_value(aggressiveness: u8) -> Result<u8> {
    if !(1..=100).contains(&aggressiveness) {
        return Err(RefineError::config_value_error(
            "aggressiveness",
            aggressiveness,
            "1-100",
        ));
    }
    let threshold = (f32::from(aggressiveness) / 100.0 * 0.9 + 0.05).clamp(0.05, 0.95);
    Ok((threshold * 255.0).round() as u8)
}

/// Convert probabilistic alpha into a decisive mask.
///
/// After this stage no pixel carries an alpha strictly between 0 and the
/// cut-off: everything under the threshold is exactly 0.
///
/// # Errors
/// - `RefineError::InvalidConfig` for aggressiveness outside 1-100
/// - `RefineError::Processing` when binary mode is requested without an
///   original image
/// - `RefineError::DimensionMismatch` when the original's dimensions
///   differ from the mask's (checked before any mutation)
pub fn apply_threshold(
    mut mask: RgbaImage,
    original: Option<&RgbaImage>,
    mode: ThresholdMode,
    aggressiveness: u8,
) -> Result<(RgbaImage, ThresholdStats)> {
    let cutoff = threshold_value(aggressiveness)?;

    if mode == ThresholdMode::Binary {
        let original = original.ok_or_else(|| {
            RefineError::processing("binary threshold mode requires the original image")
        })?;
        if original.dimensions() != mask.dimensions() {
            return Err(RefineError::dimension_mismatch(
                mask.dimensions(),
                original.dimensions(),
            ));
        }
    }

    let mut stats = ThresholdStats {
        threshold_value: cutoff,
        pixels_zeroed: 0,
        pixels_forced: 0,
    };

    for (x, y, pixel) in mask.enumerate_pixels_mut() {
        if pixel[3] < cutoff {
            if pixel[3] != 0 {
                stats.pixels_zeroed += 1;
            }
            pixel[3] = 0;
        } else if mode == ThresholdMode::Binary {
            // Checked above: binary mode always has an original.
            let source = original.unwrap().get_pixel(x, y);
            if pixel[3] != 255 || pixel[0] != source[0] || pixel[1] != source[1] || pixel[2] != source[2] {
                stats.pixels_forced += 1;
            }
            *pixel = image::Rgba([source[0], source[1], source[2], 255]);
        }
    }

    tracing::debug!(
        cutoff,
        zeroed = stats.pixels_zeroed,
        forced = stats.pixels_forced,
        "threshold applied"
    );
    Ok((mask, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient_mask(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            Rgba([10, 20, 30, (x * 255 / width.max(1)) as u8])
        })
    }

    fn opaque_count(mask: &RgbaImage) -> u64 {
        mask.pixels().filter(|p| p[3] > 0).count() as u64
    }

    #[test]
    fn test_threshold_value_formula() {
        // a=50: 0.5*0.9+0.05 = 0.50 -> round(127.5) = 128
        assert_eq!(threshold_value(50).unwrap(), 128);
        // a=1 clamps near the floor: 0.009+0.05 = 0.059 -> 15
        assert_eq!(threshold_value(1).unwrap(), 15);
        // a=100: 0.9+0.05 = 0.95 -> 242
        assert_eq!(threshold_value(100).unwrap(), 242);
    }

    #[test]
    fn test_aggressiveness_range_enforced() {
        assert!(threshold_value(0).is_err());
        assert!(threshold_value(101).is_err());
        assert!(threshold_value(1).is_ok());
        assert!(threshold_value(100).is_ok());
    }

    #[test]
    fn test_soft_mode_zeroes_below_and_keeps_above() {
        let mask = gradient_mask(64, 4);
        let (out, stats) = apply_threshold(mask, None, ThresholdMode::Soft, 50).unwrap();
        let cutoff = stats.threshold_value;
        for pixel in out.pixels() {
            assert!(pixel[3] == 0 || pixel[3] >= cutoff, "alpha {} survived", pixel[3]);
        }
        assert_eq!(stats.pixels_forced, 0);
        assert!(stats.pixels_zeroed > 0);
    }

    #[test]
    fn test_binary_mode_forces_opaque_with_original_rgb() {
        let mask = gradient_mask(64, 4);
        let original = RgbaImage::from_pixel(64, 4, Rgba([200, 150, 100, 255]));
        let (out, _) = apply_threshold(mask, Some(&original), ThresholdMode::Binary, 50).unwrap();
        for pixel in out.pixels() {
            assert!(pixel[3] == 0 || pixel[3] == 255);
            if pixel[3] == 255 {
                assert_eq!(&pixel.0[..3], &[200, 150, 100]);
            }
        }
    }

    #[test]
    fn test_binary_mode_requires_original() {
        let result = apply_threshold(gradient_mask(8, 8), None, ThresholdMode::Binary, 50);
        assert!(matches!(result, Err(RefineError::Processing { .. })));
    }

    #[test]
    fn test_binary_mode_rejects_dimension_mismatch() {
        let original = RgbaImage::new(9, 8);
        let result =
            apply_threshold(gradient_mask(8, 8), Some(&original), ThresholdMode::Binary, 50);
        assert!(matches!(
            result,
            Err(RefineError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_monotonic_in_aggressiveness() {
        let mask = gradient_mask(128, 16);
        let (low, _) = apply_threshold(mask.clone(), None, ThresholdMode::Soft, 20).unwrap();
        let (high, _) = apply_threshold(mask, None, ThresholdMode::Soft, 80).unwrap();
        assert!(opaque_count(&low) >= opaque_count(&high));
    }
}
