//! Image I/O operations service
//!
//! Separates file handling from the pixel stages. Loads fail fast with
//! descriptive errors before any pixel work begins, and checkpoint
//! writes are atomic: the buffer is encoded into a temporary file in the
//! target directory and renamed over the destination, so a crash
//! mid-stage leaves the previous checkpoint intact.

use crate::error::{RefineError, Result};
use image::RgbaImage;
use std::path::Path;

/// Service for mask/original file input and checkpoint output
pub struct ImageIoService;

impl ImageIoService {
    /// Load an image file as RGBA.
    ///
    /// # Errors
    /// * `RefineError::FileIo` when the file does not exist
    /// * `RefineError::Image` when the content cannot be decoded
    pub fn load_rgba<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(RefineError::file_io_error(
                "read image file",
                path_ref,
                std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        let image = image::open(path_ref)?;
        log::debug!(
            "Loaded {} ({}x{})",
            path_ref.display(),
            image.width(),
            image.height()
        );
        Ok(image.to_rgba8())
    }

    /// Load a mask and an optional original, enforcing the paired
    /// dimension precondition before returning either buffer.
    ///
    /// # Errors
    /// * file and decode errors as in [`load_rgba`](Self::load_rgba)
    /// * `RefineError::DimensionMismatch` when the original's size
    ///   differs from the mask's
    pub fn load_pair<P: AsRef<Path>>(
        mask_path: P,
        original_path: Option<P>,
    ) -> Result<(RgbaImage, Option<RgbaImage>)> {
        let mask = Self::load_rgba(mask_path)?;
        let original = match original_path {
            Some(path) => {
                let original = Self::load_rgba(path)?;
                if original.dimensions() != mask.dimensions() {
                    return Err(RefineError::dimension_mismatch(
                        mask.dimensions(),
                        original.dimensions(),
                    ));
                }
                Some(original)
            }
            None => None,
        };
        Ok((mask, original))
    }

    /// Write an RGBA buffer to `path` as PNG, atomically.
    ///
    /// The image is encoded into a named temporary file in the
    /// destination directory, then persisted over `path` in one rename.
    /// On any failure the previous file content is untouched.
    ///
    /// # Errors
    /// Returns `RefineError::FileIo` for directory or rename failures
    /// and `RefineError::Image` for encoding failures.
    pub fn save_png_atomic<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        let dir = path_ref.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = dir {
            std::fs::create_dir_all(parent).map_err(|e| {
                RefineError::file_io_error("create output directory", parent, e)
            })?;
        }

        let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))
            .map_err(|e| RefineError::file_io_error("create temporary file", path_ref, e))?;
        image.write_to(&mut tmp, image::ImageFormat::Png)?;
        tmp.persist(path_ref)
            .map_err(|e| RefineError::file_io_error("persist checkpoint", path_ref, e.error))?;

        log::debug!("Wrote checkpoint {}", path_ref.display());
        Ok(())
    }

    /// Render the mask over a pure-black backdrop for visual review.
    ///
    /// Edge defects that hide against transparency (halos, fringe,
    /// jagged silhouettes) stand out against black. Standard alpha-over
    /// compositing onto opaque black.
    #[must_use]
    pub fn compose_over_black(mask: &RgbaImage) -> RgbaImage {
        RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
            let pixel = mask.get_pixel(x, y);
            let alpha = u16::from(pixel[3]);
            image::Rgba([
                ((u16::from(pixel[0]) * alpha) / 255) as u8,
                ((u16::from(pixel[1]) * alpha) / 255) as u8,
                ((u16::from(pixel[2]) * alpha) / 255) as u8,
                255,
            ])
        })
    }
}
