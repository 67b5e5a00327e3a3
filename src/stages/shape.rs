//! Shape correction for roughly cylindrical products
//!
//! AI masks of bottles and jars come back with wavy sides where the
//! product is actually straight. This stage partitions the content rows
//! into cap / transition / body / base regions, takes the median body
//! edge on each side (robust against the outlier rows the model
//! produces), forces the body straight, blends the cap into the body
//! across the transition rows, and tapers the base toward the center.

use crate::config::RefineConfig;
use crate::error::{RefineError, Result};
use crate::stages::profile::extract_profile;
use image::RgbaImage;
use serde::Serialize;

/// Statistics from a shape correction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShapeStats {
    /// Pixels whose value changed during the rebuild
    pub pixels_changed: u64,
    /// Median left body edge the correction straightened to
    pub median_left: Option<u32>,
    /// Median right body edge the correction straightened to
    pub median_right: Option<u32>,
    /// First and last content row, `None` for an empty mask
    pub content_rows: Option<(u32, u32)>,
}

/// Upper median of the collected edge samples.
fn median(samples: &mut Vec<u32>) -> Option<u32> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_unstable();
    Some(samples[samples.len() / 2])
}

/// Enforce straight parallel body sides and smooth cap/base curvature.
///
/// An empty mask (no content rows) is returned unchanged: a no-op, not
/// an error. Surviving pixels take RGB from the original image when one
/// is supplied; otherwise they keep their current color.
///
/// # Errors
/// Returns `RefineError::DimensionMismatch` when an original is supplied
/// with different dimensions (checked before any mutation).
pub fn correct_shape(
    mut mask: RgbaImage,
    original: Option<&RgbaImage>,
    config: &RefineConfig,
) -> Result<(RgbaImage, ShapeStats)> {
    if let Some(original) = original {
        if original.dimensions() != mask.dimensions() {
            return Err(RefineError::dimension_mismatch(
                mask.dimensions(),
                original.dimensions(),
            ));
        }
    }

    let profile = extract_profile(&mask, config.profile_threshold);
    let Some((top, bottom)) = profile.content_rows else {
        tracing::debug!("shape correction skipped: mask has no content");
        let stats = ShapeStats {
            pixels_changed: 0,
            median_left: None,
            median_right: None,
            content_rows: None,
        };
        return Ok((mask, stats));
    };

    let content_height = f32::from(u16::try_from(bottom - top + 1).unwrap_or(u16::MAX));
    let region_row = |fraction: f32| top + (content_height * fraction).round() as u32;
    let cap_end = region_row(config.regions.cap_end);
    let transition_end = region_row(config.regions.transition_end);
    let body_end = region_row(config.regions.body_end).min(bottom + 1);

    // Median body edges, robust to outlier rows from AI noise.
    let mut left_samples = Vec::new();
    let mut right_samples = Vec::new();
    for y in transition_end..body_end {
        if let (Some(l), Some(r)) = (profile.left[y as usize], profile.right[y as usize]) {
            left_samples.push(l);
            right_samples.push(r);
        }
    }
    let (Some(median_left), Some(median_right)) =
        (median(&mut left_samples), median(&mut right_samples))
    else {
        tracing::warn!("shape correction skipped: no body rows with content to take medians from");
        let stats = ShapeStats {
            pixels_changed: 0,
            median_left: None,
            median_right: None,
            content_rows: Some((top, bottom)),
        };
        return Ok((mask, stats));
    };

    // The cap keeps its observed edges; the transition blends the last
    // cap edge into the median; body rows are the medians; the base
    // tapers both edges toward the body center.
    let cap_boundary = if cap_end > top {
        let y = (cap_end - 1) as usize;
        (
            profile.left[y].unwrap_or(median_left),
            profile.right[y].unwrap_or(median_right),
        )
    } else {
        (median_left, median_right)
    };
    let center = (f64::from(median_left) + f64::from(median_right)) / 2.0;
    let transition_len = transition_end.saturating_sub(cap_end);
    let base_len = (bottom + 1).saturating_sub(body_end);

    let corrected = |y: u32| -> Option<(u32, u32)> {
        if y < cap_end {
            return profile.left[y as usize].zip(profile.right[y as usize]);
        }
        if y < transition_end {
            let t = f64::from(y - cap_end + 1) / f64::from(transition_len + 1);
            let lerp = |from: u32, to: u32| {
                (f64::from(from) + (f64::from(to) - f64::from(from)) * t).round() as u32
            };
            return Some((
                lerp(cap_boundary.0, median_left),
                lerp(cap_boundary.1, median_right),
            ));
        }
        if y < body_end {
            return Some((median_left, median_right));
        }
        let t = if base_len > 1 {
            f64::from(y - body_end) / f64::from(base_len - 1)
        } else {
            0.0
        };
        let taper = |edge: u32| {
            (f64::from(edge) + (center - f64::from(edge)) * f64::from(config.base_curve) * t)
                .round() as u32
        };
        Some((taper(median_left), taper(median_right)))
    };

    // Rebuild the alpha mask row by row from the corrected edges.
    let (width, height) = mask.dimensions();
    let mut pixels_changed = 0u64;
    for y in 0..height {
        let span = if (top..=bottom).contains(&y) {
            corrected(y).filter(|(l, r)| l <= r)
        } else {
            None
        };
        for x in 0..width {
            let inside = span.is_some_and(|(l, r)| (l..=r).contains(&x));
            let pixel = mask.get_pixel_mut(x, y);
            if inside {
                let rgb = original.map_or([pixel[0], pixel[1], pixel[2]], |o| {
                    let p = o.get_pixel(x, y);
                    [p[0], p[1], p[2]]
                });
                let next = image::Rgba([rgb[0], rgb[1], rgb[2], 255]);
                if *pixel != next {
                    pixels_changed += 1;
                    *pixel = next;
                }
            } else if pixel[3] != 0 {
                pixels_changed += 1;
                pixel[3] = 0;
            }
        }
    }

    tracing::debug!(
        median_left,
        median_right,
        pixels_changed,
        "shape correction applied"
    );
    let stats = ShapeStats {
        pixels_changed,
        median_left: Some(median_left),
        median_right: Some(median_right),
        content_rows: Some((top, bottom)),
    };
    Ok((mask, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegionLayout;
    use image::Rgba;

    /// Uniform straight-sided mask: opaque between `left..=right` on the
    /// given rows.
    fn straight_mask(
        width: u32,
        height: u32,
        rows: std::ops::RangeInclusive<u32>,
        left: u32,
        right: u32,
    ) -> RgbaImage {
        let mut mask = RgbaImage::new(width, height);
        for y in rows {
            for x in left..=right {
                mask.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        mask
    }

    fn no_taper_config() -> RefineConfig {
        RefineConfig::builder().base_curve(0.0).build().unwrap()
    }

    #[test]
    fn test_already_straight_mask_is_unchanged() {
        // 500x800, left=50/right=450 for rows 100-700, body region
        // 20%-85%: already straight, so nothing changes.
        let mask = straight_mask(500, 800, 100..=700, 50, 450);
        let (out, stats) = correct_shape(mask.clone(), None, &no_taper_config()).unwrap();
        assert_eq!(stats.pixels_changed, 0);
        assert_eq!(stats.median_left, Some(50));
        assert_eq!(stats.median_right, Some(450));
        assert_eq!(stats.content_rows, Some((100, 700)));
        assert_eq!(out, mask);
    }

    #[test]
    fn test_body_rows_straightened_to_median() {
        let mut mask = straight_mask(200, 100, 10..=90, 40, 160);
        // Inject outlier body rows: jagged left edge.
        for x in 30..40 {
            mask.put_pixel(x, 50, Rgba([255, 255, 255, 255]));
        }
        for x in 40..55 {
            mask.put_pixel(x, 60, Rgba([0, 0, 0, 0]));
        }
        let (out, stats) = correct_shape(mask, None, &no_taper_config()).unwrap();
        assert!(stats.pixels_changed > 0);
        assert_eq!(stats.median_left, Some(40));

        let profile = extract_profile(&out, 0);
        let (top, bottom) = stats.content_rows.unwrap();
        let h = (bottom - top + 1) as f32;
        let body_start = top + (h * 0.20).round() as u32;
        let body_end = top + (h * 0.85).round() as u32;
        for y in body_start..body_end {
            assert_eq!(profile.left[y as usize], Some(40), "row {y}");
            assert_eq!(profile.right[y as usize], Some(160), "row {y}");
        }
    }

    #[test]
    fn test_base_taper_pulls_edges_toward_center() {
        let mask = straight_mask(200, 100, 0..=99, 40, 160);
        let config = RefineConfig::builder().base_curve(0.30).build().unwrap();
        let (out, _) = correct_shape(mask, None, &config).unwrap();
        let profile = extract_profile(&out, 0);

        // Bottom row has the full taper: 30% of the way to center 100.
        assert_eq!(profile.left[99], Some(58));
        assert_eq!(profile.right[99], Some(142));
        // First base row is untapered.
        let base_start = (100.0f32 * 0.85).round() as usize;
        assert_eq!(profile.left[base_start], Some(40));
    }

    #[test]
    fn test_empty_mask_is_noop() {
        let mask = RgbaImage::new(50, 50);
        let (out, stats) = correct_shape(mask.clone(), None, &no_taper_config()).unwrap();
        assert_eq!(stats.pixels_changed, 0);
        assert_eq!(stats.content_rows, None);
        assert_eq!(out, mask);
    }

    #[test]
    fn test_dimension_mismatch_rejected_before_mutation() {
        let mask = straight_mask(50, 50, 10..=40, 10, 40);
        let original = RgbaImage::new(51, 50);
        let result = correct_shape(mask, Some(&original), &no_taper_config());
        assert!(matches!(
            result,
            Err(RefineError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_body_rows_are_recovered_from_medians() {
        // AI dropout: a fully empty row inside the body gets refilled.
        let mut mask = straight_mask(100, 100, 10..=90, 30, 70);
        for x in 0..100 {
            mask.put_pixel(x, 50, Rgba([0, 0, 0, 0]));
        }
        let (out, _) = correct_shape(mask, None, &no_taper_config()).unwrap();
        let profile = extract_profile(&out, 0);
        assert_eq!(profile.left[50], Some(30));
        assert_eq!(profile.right[50], Some(70));
    }

    #[test]
    fn test_rgb_taken_from_original_when_supplied() {
        let mask = straight_mask(40, 40, 5..=35, 10, 30);
        let original = RgbaImage::from_pixel(40, 40, Rgba([12, 34, 56, 255]));
        let config = RefineConfig::builder()
            .base_curve(0.0)
            .regions(RegionLayout::default())
            .build()
            .unwrap();
        let (out, _) = correct_shape(mask, Some(&original), &config).unwrap();
        let sample = out.get_pixel(20, 20);
        assert_eq!(sample.0, [12, 34, 56, 255]);
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let mut mask = straight_mask(120, 80, 5..=75, 20, 100);
        for x in 15..20 {
            mask.put_pixel(x, 40, Rgba([255, 255, 255, 255]));
        }
        let (once, _) = correct_shape(mask, None, &no_taper_config()).unwrap();
        let (twice, stats) = correct_shape(once.clone(), None, &no_taper_config()).unwrap();
        assert_eq!(stats.pixels_changed, 0);
        assert_eq!(once, twice);
    }
}
