//! Morphological alpha dilation: recover small gaps at mask edges
//!
//! The AI occasionally zeroes pixels that belong to the product,
//! especially along high-frequency edges. A max-filter with a circular
//! structuring element grows the mask back over those gaps. The
//! operation touches only the alpha channel and is monotonic: no pixel
//! ever loses alpha.

use crate::config::RefineConfig;
use crate::error::{RefineError, Result};
use image::RgbaImage;
use serde::Serialize;

/// Statistics from a dilation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DilateStats {
    /// Radius of the circular structuring element applied
    pub radius: u32,
    /// Pixels whose alpha increased
    pub pixels_grown: u64,
}

/// Offsets of all lattice points within Euclidean distance `radius`.
fn disk_offsets(radius: u32) -> Vec<(i64, i64)> {
    let r = i64::from(radius);
    let r_sq = r * r;
    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r_sq {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Dilate the alpha channel with a circular structuring element.
///
/// Each output alpha is the maximum input alpha over all pixels within
/// Euclidean distance `radius`, so the result dominates the input
/// everywhere and `radius = 0` is an exact no-op. Cost grows with
/// radius squared; the configured `max_dilate_radius` (default 20)
/// bounds it.
///
/// # Errors
/// Returns `RefineError::InvalidConfig` when `radius` exceeds
/// `config.max_dilate_radius`.
pub fn dilate(
    mut mask: RgbaImage,
    radius: u32,
    config: &RefineConfig,
) -> Result<(RgbaImage, DilateStats)> {
    if radius > config.max_dilate_radius {
        return Err(RefineError::config_value_error(
            "radius",
            radius,
            format!("0-{}", config.max_dilate_radius).as_str(),
        ));
    }
    if radius == 0 {
        return Ok((mask, DilateStats { radius, pixels_grown: 0 }));
    }

    let (width, height) = mask.dimensions();
    let offsets = disk_offsets(radius);
    let source: Vec<u8> = mask.pixels().map(|p| p[3]).collect();
    let alpha_at = |x: i64, y: i64| -> u8 {
        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
            0
        } else {
            source[(y * i64::from(width) + x) as usize]
        }
    };

    let mut pixels_grown = 0u64;
    for y in 0..height {
        for x in 0..width {
            let current = source[(y * width + x) as usize];
            if current == 255 {
                continue;
            }
            let mut best = current;
            for &(dx, dy) in &offsets {
                let candidate = alpha_at(i64::from(x) + dx, i64::from(y) + dy);
                if candidate > best {
                    best = candidate;
                    if best == 255 {
                        break;
                    }
                }
            }
            if best > current {
                pixels_grown += 1;
                mask.get_pixel_mut(x, y)[3] = best;
            }
        }
    }

    tracing::debug!(radius, pixels_grown, "dilation applied");
    Ok((mask, DilateStats { radius, pixels_grown }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn single_pixel_mask(width: u32, height: u32, x: u32, y: u32) -> RgbaImage {
        let mut mask = RgbaImage::new(width, height);
        mask.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        mask
    }

    fn opaque_count(mask: &RgbaImage) -> usize {
        mask.pixels().filter(|p| p[3] == 255).count()
    }

    #[test]
    fn test_radius_zero_is_noop() {
        let mask = single_pixel_mask(10, 10, 5, 5);
        let (out, stats) = dilate(mask.clone(), 0, &RefineConfig::default()).unwrap();
        assert_eq!(out, mask);
        assert_eq!(stats.pixels_grown, 0);
    }

    #[test]
    fn test_isolated_pixel_becomes_radius_3_disk() {
        // Lattice points within distance 3 of the center: 29.
        let mask = single_pixel_mask(20, 20, 10, 10);
        let (out, stats) = dilate(mask, 3, &RefineConfig::default()).unwrap();
        assert_eq!(opaque_count(&out), 29);
        assert_eq!(stats.pixels_grown, 28);
        // The disk is exactly the lattice-distance criterion.
        for y in 0..20i64 {
            for x in 0..20i64 {
                let inside = (x - 10).pow(2) + (y - 10).pow(2) <= 9;
                let alpha = out.get_pixel(x as u32, y as u32)[3];
                assert_eq!(alpha == 255, inside, "({x},{y})");
            }
        }
    }

    #[test]
    fn test_monotonic_everywhere() {
        let mut mask = RgbaImage::from_fn(32, 32, |x, y| Rgba([0, 0, 0, ((x * y) % 256) as u8]));
        mask.put_pixel(16, 16, Rgba([0, 0, 0, 255]));
        let before = mask.clone();
        let (out, _) = dilate(mask, 4, &RefineConfig::default()).unwrap();
        for (b, a) in before.pixels().zip(out.pixels()) {
            assert!(a[3] >= b[3]);
        }
    }

    #[test]
    fn test_rgb_untouched() {
        let mut mask = RgbaImage::from_pixel(10, 10, Rgba([7, 8, 9, 0]));
        mask.put_pixel(5, 5, Rgba([100, 110, 120, 255]));
        let (out, _) = dilate(mask, 2, &RefineConfig::default()).unwrap();
        assert_eq!(&out.get_pixel(4, 5).0[..3], &[7, 8, 9]);
        assert_eq!(out.get_pixel(4, 5)[3], 255);
    }

    #[test]
    fn test_border_pixels_do_not_wrap() {
        let mask = single_pixel_mask(10, 10, 0, 0);
        let (out, _) = dilate(mask, 2, &RefineConfig::default()).unwrap();
        // The far corner must stay empty.
        assert_eq!(out.get_pixel(9, 9)[3], 0);
        assert_eq!(out.get_pixel(2, 0)[3], 255);
        assert_eq!(out.get_pixel(0, 2)[3], 255);
    }

    #[test]
    fn test_radius_bound_enforced() {
        let mask = RgbaImage::new(5, 5);
        let result = dilate(mask, 21, &RefineConfig::default());
        assert!(matches!(
            result,
            Err(RefineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_semi_transparent_values_propagate_as_max() {
        let mut mask = RgbaImage::new(9, 1);
        mask.put_pixel(4, 0, Rgba([0, 0, 0, 130]));
        let (out, _) = dilate(mask, 2, &RefineConfig::default()).unwrap();
        assert_eq!(out.get_pixel(2, 0)[3], 130);
        assert_eq!(out.get_pixel(6, 0)[3], 130);
        assert_eq!(out.get_pixel(7, 0)[3], 0);
    }
}
