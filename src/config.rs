//! Configuration for mask refinement stages
//!
//! Every threshold and fraction that was historically hard-coded across
//! the individual tools lives here with a documented default and valid
//! range, and is injected into each stage.

use crate::error::{RefineError, Result};
use serde::{Deserialize, Serialize};

/// Image corner used for background sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    /// Top-left corner block
    TopLeft,
    /// Top-right corner block
    TopRight,
    /// Bottom-left corner block
    BottomLeft,
    /// Bottom-right corner block
    BottomRight,
}

/// Fractional row-range layout for shape correction.
///
/// Each field is a fraction of the content height (the rows between the
/// first and last row with any mask content). The regions are:
/// cap `[0, cap_end)`, transition `[cap_end, transition_end)`,
/// body `[transition_end, body_end)`, base `[body_end, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionLayout {
    /// End of the cap region as a fraction of content height (default 0.15)
    pub cap_end: f32,
    /// End of the cap-to-body transition (default 0.20)
    pub transition_end: f32,
    /// End of the straight body (default 0.85); the base runs to 1.0
    pub body_end: f32,
}

impl Default for RegionLayout {
    fn default() -> Self {
        Self {
            cap_end: 0.15,
            transition_end: 0.20,
            body_end: 0.85,
        }
    }
}

impl RegionLayout {
    /// Validate ordering and bounds of the region fractions
    ///
    /// # Errors
    /// Returns `RefineError::InvalidConfig` when the fractions are not
    /// ordered `0 <= cap_end <= transition_end <= body_end <= 1`.
    pub fn validate(&self) -> Result<()> {
        let ordered = 0.0 <= self.cap_end
            && self.cap_end <= self.transition_end
            && self.transition_end <= self.body_end
            && self.body_end <= 1.0;
        if !ordered {
            return Err(RefineError::invalid_config(format!(
                "region fractions must satisfy 0 <= cap_end <= transition_end <= body_end <= 1, \
                 got cap_end={}, transition_end={}, body_end={}",
                self.cap_end, self.transition_end, self.body_end
            )));
        }
        Ok(())
    }
}

/// Configuration shared by all refinement stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefineConfig {
    /// Side length in pixels of each sampled corner block (default 15, valid 1-64)
    pub corner_block: u32,

    /// Corners sampled for the background model (default: the two top corners,
    /// which sit above the product in a typical packshot)
    pub corners: Vec<Corner>,

    /// Alpha value a pixel must exceed to count as content for edge
    /// profiling and editing (default 0)
    pub profile_threshold: u8,

    /// Alpha value a pixel must exceed to count as content for mirroring
    /// (default 128; mirror trusts only confident pixels)
    pub activation_threshold: u8,

    /// Luminosity rise above background that marks a light product pixel
    /// (default 15.0)
    pub luminosity_threshold: f32,

    /// Luminosity drop below background that marks a dark product pixel
    /// (default 80.0)
    pub dark_band: f32,

    /// Euclidean RGB distance under which a pixel is considered background
    /// and skipped by fill operations (default 50.0)
    pub color_distance: f32,

    /// Pixels past a replaced edge that fills overwrite to erase residual
    /// soft-transition pixels (default 5)
    pub blend_zone: u32,

    /// Fractional regions for shape correction
    pub regions: RegionLayout,

    /// Fraction of the edge-to-center distance the base region tapers
    /// inward (default 0.30, valid 0-1; 0 disables the taper)
    pub base_curve: f32,

    /// Upper bound on the dilation radius; cost grows with radius squared
    /// (default 20)
    pub max_dilate_radius: u32,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            corner_block: 15,
            corners: vec![Corner::TopLeft, Corner::TopRight],
            profile_threshold: 0,
            activation_threshold: 128,
            luminosity_threshold: 15.0,
            dark_band: 80.0,
            color_distance: 50.0,
            blend_zone: 5,
            regions: RegionLayout::default(),
            base_curve: 0.30,
            max_dilate_radius: 20,
        }
    }
}

impl RefineConfig {
    /// Create a new configuration builder for fluent construction
    #[must_use]
    pub fn builder() -> RefineConfigBuilder {
        RefineConfigBuilder::default()
    }

    /// Validate all configuration parameters against their documented ranges
    ///
    /// # Errors
    /// Returns `RefineError::InvalidConfig` describing the first parameter
    /// found outside its valid range.
    pub fn validate(&self) -> Result<()> {
        if !(1..=64).contains(&self.corner_block) {
            return Err(RefineError::config_value_error(
                "corner_block",
                self.corner_block,
                "1-64",
            ));
        }
        if self.corners.is_empty() {
            return Err(RefineError::invalid_config(
                "at least one corner must be sampled for the background model",
            ));
        }
        if !self.luminosity_threshold.is_finite() || self.luminosity_threshold < 0.0 {
            return Err(RefineError::config_value_error(
                "luminosity_threshold",
                self.luminosity_threshold,
                "finite values >= 0",
            ));
        }
        if !self.dark_band.is_finite() || self.dark_band < 0.0 {
            return Err(RefineError::config_value_error(
                "dark_band",
                self.dark_band,
                "finite values >= 0",
            ));
        }
        if !self.color_distance.is_finite() || self.color_distance < 0.0 {
            return Err(RefineError::config_value_error(
                "color_distance",
                self.color_distance,
                "finite values >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.base_curve) {
            return Err(RefineError::config_value_error(
                "base_curve",
                self.base_curve,
                "0.0-1.0",
            ));
        }
        self.regions.validate()
    }
}

/// Builder for `RefineConfig`
#[derive(Debug, Default)]
pub struct RefineConfigBuilder {
    config: RefineConfig,
}

impl RefineConfigBuilder {
    /// Set the corner block side length
    #[must_use]
    pub fn corner_block(mut self, pixels: u32) -> Self {
        self.config.corner_block = pixels;
        self
    }

    /// Set the corners sampled for the background model
    #[must_use]
    pub fn corners(mut self, corners: Vec<Corner>) -> Self {
        self.config.corners = corners;
        self
    }

    /// Set the edge-profiling activation threshold
    #[must_use]
    pub fn profile_threshold(mut self, threshold: u8) -> Self {
        self.config.profile_threshold = threshold;
        self
    }

    /// Set the mirroring activation threshold
    #[must_use]
    pub fn activation_threshold(mut self, threshold: u8) -> Self {
        self.config.activation_threshold = threshold;
        self
    }

    /// Set the light-product luminosity threshold
    #[must_use]
    pub fn luminosity_threshold(mut self, threshold: f32) -> Self {
        self.config.luminosity_threshold = threshold;
        self
    }

    /// Set the dark-product luminosity band
    #[must_use]
    pub fn dark_band(mut self, band: f32) -> Self {
        self.config.dark_band = band;
        self
    }

    /// Set the background color-distance threshold
    #[must_use]
    pub fn color_distance(mut self, distance: f32) -> Self {
        self.config.color_distance = distance;
        self
    }

    /// Set the blend zone width
    #[must_use]
    pub fn blend_zone(mut self, pixels: u32) -> Self {
        self.config.blend_zone = pixels;
        self
    }

    /// Set the shape-correction region layout
    #[must_use]
    pub fn regions(mut self, regions: RegionLayout) -> Self {
        self.config.regions = regions;
        self
    }

    /// Set the base taper fraction (0 disables the taper)
    #[must_use]
    pub fn base_curve(mut self, fraction: f32) -> Self {
        self.config.base_curve = fraction;
        self
    }

    /// Set the maximum allowed dilation radius
    #[must_use]
    pub fn max_dilate_radius(mut self, radius: u32) -> Self {
        self.config.max_dilate_radius = radius;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// Returns `RefineError::InvalidConfig` when any parameter is outside
    /// its documented range.
    pub fn build(self) -> Result<RefineConfig> {
        let config = self.config;
        config.validate()?;
        Ok(config)
    }
}
