//! Edge profile extraction
//!
//! Linear per-row scans over the alpha channel. The profile is derived
//! data: callers recompute it whenever they need a current view, because
//! any mutating stage invalidates a previously extracted profile.

use crate::types::EdgeProfile;
use image::RgbaImage;

/// Extract the per-row leftmost/rightmost foreground coordinates.
///
/// A pixel counts as foreground when its alpha is strictly greater than
/// `activation` (pass 0 to include every non-transparent pixel, 128 to
/// trust only confident pixels). O(width * height) worst case.
#[must_use]
pub fn extract_profile(mask: &RgbaImage, activation: u8) -> EdgeProfile {
    let (width, height) = mask.dimensions();
    let mut left = vec![None; height as usize];
    let mut right = vec![None; height as usize];
    let mut top = None;
    let mut bottom = None;

    for y in 0..height {
        let mut first = None;
        for x in 0..width {
            if mask.get_pixel(x, y)[3] > activation {
                first = Some(x);
                break;
            }
        }
        let Some(first_x) = first else { continue };

        let mut last = first_x;
        for x in (first_x..width).rev() {
            if mask.get_pixel(x, y)[3] > activation {
                last = x;
                break;
            }
        }

        left[y as usize] = Some(first_x);
        right[y as usize] = Some(last);
        if top.is_none() {
            top = Some(y);
        }
        bottom = Some(y);
    }

    EdgeProfile {
        left,
        right,
        content_rows: top.zip(bottom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Mask with an opaque horizontal band on the given rows and columns.
    fn band_mask(width: u32, height: u32, rows: std::ops::Range<u32>, cols: std::ops::Range<u32>) -> RgbaImage {
        let mut mask = RgbaImage::new(width, height);
        for y in rows {
            for x in cols.clone() {
                mask.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        mask
    }

    #[test]
    fn test_empty_mask_has_no_content() {
        let profile = extract_profile(&RgbaImage::new(10, 10), 0);
        assert!(profile.is_empty());
        assert!(profile.left.iter().all(Option::is_none));
        assert_eq!(profile.height(), 10);
    }

    #[test]
    fn test_band_edges_and_content_rows() {
        let mask = band_mask(20, 10, 3..7, 5..15);
        let profile = extract_profile(&mask, 0);
        assert_eq!(profile.content_rows, Some((3, 6)));
        assert_eq!(profile.left[4], Some(5));
        assert_eq!(profile.right[4], Some(14));
        assert_eq!(profile.left[0], None);
        assert_eq!(profile.right[9], None);
    }

    #[test]
    fn test_activation_threshold_filters_soft_pixels() {
        let mut mask = RgbaImage::new(10, 1);
        mask.put_pixel(2, 0, Rgba([0, 0, 0, 100]));
        mask.put_pixel(5, 0, Rgba([0, 0, 0, 200]));

        let permissive = extract_profile(&mask, 0);
        assert_eq!(permissive.left[0], Some(2));
        assert_eq!(permissive.right[0], Some(5));

        let strict = extract_profile(&mask, 128);
        assert_eq!(strict.left[0], Some(5));
        assert_eq!(strict.right[0], Some(5));

        let none = extract_profile(&mask, 200);
        assert!(none.is_empty());
    }

    #[test]
    fn test_single_pixel_row() {
        let mask = band_mask(10, 3, 1..2, 7..8);
        let profile = extract_profile(&mask, 0);
        assert_eq!(profile.left[1], Some(7));
        assert_eq!(profile.right[1], Some(7));
        assert_eq!(profile.content_rows, Some((1, 1)));
    }
}
