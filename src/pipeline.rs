//! Refinement pipeline: one owner for the working buffer
//!
//! The historical tool fleet re-loaded the mask, re-derived the
//! background color, and re-implemented thresholds in every script. The
//! pipeline replaces that with a single object that owns the working
//! RGBA buffer, the optional original, and the once-computed background
//! model. Stage methods consume the pipeline and hand back the
//! transformed state together with that stage's statistics; there is no
//! aliasing and no global state, and stages on one image are strictly
//! sequential. Separate images get separate pipelines and can be
//! processed in parallel processes with zero coordination.

use crate::config::RefineConfig;
use crate::error::{RefineError, Result};
use crate::services::io::ImageIoService;
use crate::stages::{
    self, CompositeStats, DilateStats, EditStats, HardenMode, HardenStats, MirrorStats, Rect,
    ShapeStats, ThresholdMode, ThresholdStats,
};
use crate::types::{BackgroundModel, EdgeProfile, Side};
use image::RgbaImage;
use std::path::Path;

/// Owner of one image's refinement state.
///
/// Created from in-memory buffers or from files; stages are applied in
/// whatever order the operator chooses; [`save`](Self::save) writes the
/// current buffer atomically as a checkpoint.
pub struct RefinePipeline {
    mask: RgbaImage,
    original: Option<RgbaImage>,
    background: Option<BackgroundModel>,
    config: RefineConfig,
}

impl RefinePipeline {
    /// Create a pipeline over a mask buffer with no original image.
    ///
    /// Stages that require the original (binary thresholding, hardening)
    /// will fail; everything else runs with reduced fidelity (fills fall
    /// back to white, no background skip test).
    #[must_use]
    pub fn new(mask: RgbaImage, config: RefineConfig) -> Self {
        Self {
            mask,
            original: None,
            background: None,
            config,
        }
    }

    /// Create a pipeline over a mask buffer paired with its original.
    ///
    /// The background model is sampled here, exactly once; every stage
    /// that consults it sees the same values.
    ///
    /// # Errors
    /// Returns `RefineError::DimensionMismatch` when the two buffers
    /// differ in size, checked before any pixel work.
    pub fn with_original(
        mask: RgbaImage,
        original: RgbaImage,
        config: RefineConfig,
    ) -> Result<Self> {
        if mask.dimensions() != original.dimensions() {
            return Err(RefineError::dimension_mismatch(
                mask.dimensions(),
                original.dimensions(),
            ));
        }
        let background = stages::sample_background(&original, &config);
        tracing::debug!(?background, "background model sampled");
        Ok(Self {
            mask,
            original: Some(original),
            background: Some(background),
            config,
        })
    }

    /// Load a pipeline from a mask file and an optional original file.
    ///
    /// # Errors
    /// Fails before any pixel work for missing/unreadable files or a
    /// mask/original dimension mismatch.
    pub fn from_files<P: AsRef<Path>>(
        mask_path: P,
        original_path: Option<P>,
        config: RefineConfig,
    ) -> Result<Self> {
        let mask = ImageIoService::load_rgba(mask_path)?;
        match original_path {
            Some(path) => {
                let original = ImageIoService::load_rgba(path)?;
                Self::with_original(mask, original, config)
            }
            None => Ok(Self::new(mask, config)),
        }
    }

    /// The current working buffer.
    #[must_use]
    pub const fn mask(&self) -> &RgbaImage {
        &self.mask
    }

    /// Working buffer dimensions.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.mask.dimensions()
    }

    /// The background model, when an original was supplied.
    #[must_use]
    pub const fn background(&self) -> Option<&BackgroundModel> {
        self.background.as_ref()
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RefineConfig {
        &self.config
    }

    /// Extract a fresh edge profile from the current buffer.
    #[must_use]
    pub fn profile(&self, activation: u8) -> EdgeProfile {
        stages::extract_profile(&self.mask, activation)
    }

    /// Convert probabilistic alpha to a decisive mask.
    ///
    /// # Errors
    /// Propagates stage errors (invalid aggressiveness, missing original
    /// for binary mode).
    pub fn threshold(
        mut self,
        mode: ThresholdMode,
        aggressiveness: u8,
    ) -> Result<(Self, ThresholdStats)> {
        let (mask, stats) =
            stages::apply_threshold(self.mask, self.original.as_ref(), mode, aggressiveness)?;
        self.mask = mask;
        Ok((self, stats))
    }

    /// Enforce straight body sides and smooth cap/base curvature.
    ///
    /// # Errors
    /// Propagates stage errors.
    pub fn correct_shape(mut self) -> Result<(Self, ShapeStats)> {
        let (mask, stats) =
            stages::correct_shape(self.mask, self.original.as_ref(), &self.config)?;
        self.mask = mask;
        Ok((self, stats))
    }

    /// Reflect the clean side onto the damaged side about `center`.
    ///
    /// # Errors
    /// Propagates stage errors (invalid center or row range).
    pub fn mirror(
        mut self,
        center: u32,
        source: Side,
        rows: Option<std::ops::Range<u32>>,
    ) -> Result<(Self, MirrorStats)> {
        let (mask, stats) = stages::mirror(
            self.mask,
            self.original.as_ref(),
            center,
            source,
            rows,
            self.config.activation_threshold,
        )?;
        self.mask = mask;
        Ok((self, stats))
    }

    /// Eliminate semi-transparent fringe pixels against the original.
    ///
    /// # Errors
    /// Returns `RefineError::Processing` when the pipeline has no
    /// original image; hardening needs its luminosity.
    pub fn harden(mut self, mode: HardenMode) -> Result<(Self, HardenStats)> {
        let original = self.original.as_ref().ok_or_else(|| {
            RefineError::processing("edge hardening requires the original image")
        })?;
        let background = self.background.as_ref().ok_or_else(|| {
            RefineError::processing("edge hardening requires a background model")
        })?;
        let (mask, stats) =
            stages::harden(self.mask, original, background, mode, &self.config)?;
        self.mask = mask;
        Ok((self, stats))
    }

    /// Place a hard edge at `x` on one side for the given rows.
    ///
    /// # Errors
    /// Propagates stage errors (out-of-bounds coordinates).
    pub fn set_edge(
        mut self,
        side: Side,
        x: u32,
        rows: std::ops::Range<u32>,
    ) -> Result<(Self, EditStats)> {
        let (mask, stats) = stages::set_edge(
            self.mask,
            self.original.as_ref(),
            self.background.as_ref(),
            side,
            x,
            rows,
            &self.config,
        )?;
        self.mask = mask;
        Ok((self, stats))
    }

    /// Fill a rectangular region opaque (background-like pixels skipped).
    ///
    /// # Errors
    /// Propagates stage errors (rectangle out of bounds).
    pub fn fill_rect(mut self, rect: Rect) -> Result<(Self, EditStats)> {
        let (mask, stats) = stages::fill_rect(
            self.mask,
            self.original.as_ref(),
            self.background.as_ref(),
            rect,
            &self.config,
        )?;
        self.mask = mask;
        Ok((self, stats))
    }

    /// Clear a rectangular region to transparency.
    ///
    /// # Errors
    /// Propagates stage errors (rectangle out of bounds).
    pub fn clear_rect(mut self, rect: Rect) -> Result<(Self, EditStats)> {
        let (mask, stats) = stages::clear_rect(self.mask, rect)?;
        self.mask = mask;
        Ok((self, stats))
    }

    /// Grow the mask with a circular max-filter.
    ///
    /// # Errors
    /// Propagates stage errors (radius above the configured bound).
    pub fn dilate(mut self, radius: u32) -> Result<(Self, DilateStats)> {
        let (mask, stats) = stages::dilate(self.mask, radius, &self.config)?;
        self.mask = mask;
        Ok((self, stats))
    }

    /// Trim, scale, and center onto the final delivery canvas.
    ///
    /// The working buffer is replaced by the canvas; the original (which
    /// no longer shares its dimensions) is dropped along with the
    /// background model.
    ///
    /// # Errors
    /// Propagates stage errors (invalid size/padding, empty mask).
    pub fn composite(mut self, target_size: u32, padding: f32) -> Result<(Self, CompositeStats)> {
        let (canvas, stats) = stages::compose(&self.mask, target_size, padding)?;
        self.mask = canvas;
        self.original = None;
        self.background = None;
        Ok((self, stats))
    }

    /// Atomically write the current buffer to `path` (the per-stage
    /// checkpoint).
    ///
    /// # Errors
    /// Propagates I/O and encoding errors; on failure the previous file
    /// content is left intact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        ImageIoService::save_png_atomic(&self.mask, path)
    }

    /// Consume the pipeline and take the buffer.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.mask
    }
}
