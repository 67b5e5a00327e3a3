//! Core data types shared across pipeline stages

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Mean luminosity of an RGBA pixel, ignoring alpha.
///
/// Defined as `(R + G + B) / 3`, the same measure the background model
/// and the edge hardener use, so comparisons are consistent everywhere.
#[must_use]
pub fn luminosity(pixel: &Rgba<u8>) -> f32 {
    (f32::from(pixel[0]) + f32::from(pixel[1]) + f32::from(pixel[2])) / 3.0
}

/// Which side of the image an operation targets or trusts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The left edge
    Left,
    /// The right edge
    Right,
}

impl Side {
    /// The opposite side
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// Background color model sampled from the original (non-cutout) image.
///
/// Computed once per image from fixed corner blocks and reused by every
/// stage operating on that image, never recomputed mid-pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackgroundModel {
    /// Mean RGB of the sampled corner pixels
    pub mean: [f32; 3],
    /// Mean luminosity `(R + G + B) / 3` of the sampled corner pixels
    pub luminosity: f32,
}

impl BackgroundModel {
    /// Euclidean RGB distance between this model's mean color and a pixel
    #[must_use]
    pub fn distance(&self, rgb: [u8; 3]) -> f32 {
        let dr = self.mean[0] - f32::from(rgb[0]);
        let dg = self.mean[1] - f32::from(rgb[1]);
        let db = self.mean[2] - f32::from(rgb[2]);
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Whether a pixel's color is close enough to the background to be
    /// treated as background rather than product.
    #[must_use]
    pub fn is_background(&self, rgb: [u8; 3], color_distance: f32) -> bool {
        self.distance(rgb) < color_distance
    }
}

/// Per-row leftmost/rightmost foreground coordinates.
///
/// `left[y]` / `right[y]` hold the first and last x with alpha above the
/// activation threshold the profile was extracted with, or `None` when the
/// row has no content. Derived data: recompute from the current mask
/// whenever a stage needs a fresh view; never cache across mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeProfile {
    /// Leftmost active x per row, `None` for empty rows
    pub left: Vec<Option<u32>>,
    /// Rightmost active x per row, `None` for empty rows
    pub right: Vec<Option<u32>>,
    /// First and last row with any content, `None` for an empty mask
    pub content_rows: Option<(u32, u32)>,
}

impl EdgeProfile {
    /// Number of rows in the profile (always the mask height)
    #[must_use]
    pub fn height(&self) -> u32 {
        self.left.len() as u32
    }

    /// Whether the mask had any content at all
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.content_rows.is_none()
    }

    /// Height of the content span in rows (0 for an empty mask)
    #[must_use]
    pub fn content_height(&self) -> u32 {
        self.content_rows.map_or(0, |(top, bottom)| bottom - top + 1)
    }
}

/// Axis-aligned bounding box of mask content, in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBox {
    /// Left edge (inclusive)
    pub x: u32,
    /// Top edge (inclusive)
    pub y: u32,
    /// Width in pixels (at least 1)
    pub width: u32,
    /// Height in pixels (at least 1)
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminosity_is_channel_mean() {
        assert!((luminosity(&Rgba([30, 60, 90, 255])) - 60.0).abs() < f32::EPSILON);
        assert!((luminosity(&Rgba([0, 0, 0, 0])) - 0.0).abs() < f32::EPSILON);
        assert!((luminosity(&Rgba([255, 255, 255, 0])) - 255.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }

    #[test]
    fn test_background_distance() {
        let model = BackgroundModel {
            mean: [240.0, 240.0, 240.0],
            luminosity: 240.0,
        };
        assert!((model.distance([240, 240, 240]) - 0.0).abs() < f32::EPSILON);
        assert!(model.is_background([235, 238, 244], 50.0));
        assert!(!model.is_background([40, 40, 40], 50.0));
    }

    #[test]
    fn test_profile_content_height() {
        let profile = EdgeProfile {
            left: vec![None; 10],
            right: vec![None; 10],
            content_rows: Some((2, 7)),
        };
        assert_eq!(profile.content_height(), 6);
        assert!(!profile.is_empty());

        let empty = EdgeProfile {
            left: vec![None; 10],
            right: vec![None; 10],
            content_rows: None,
        };
        assert_eq!(empty.content_height(), 0);
        assert!(empty.is_empty());
    }
}
